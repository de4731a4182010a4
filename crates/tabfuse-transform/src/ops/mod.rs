//! The built-in transformation catalog.

mod calculated;
mod columns;
mod date;
mod numeric;
mod text;

pub use calculated::CalculatedColumn;
pub use columns::{ConvertType, DropColumns, FilterRows, RenameColumns, ReplaceValues};
pub use date::{DateComponent, DateDifference, DateFormat};
pub use numeric::{Binning, MathOperation, NumericScaling};
pub use text::{PatternExtract, PatternReplace, TextCase};

use crate::registry::Transform;

/// Every built-in transformation, in catalog order.
pub fn builtin() -> Vec<Box<dyn Transform>> {
    vec![
        Box::new(DateFormat),
        Box::new(DateComponent),
        Box::new(DateDifference),
        Box::new(NumericScaling),
        Box::new(Binning),
        Box::new(MathOperation),
        Box::new(TextCase),
        Box::new(PatternExtract),
        Box::new(PatternReplace),
        Box::new(CalculatedColumn),
        Box::new(ConvertType),
        Box::new(ReplaceValues),
        Box::new(FilterRows),
        Box::new(RenameColumns),
        Box::new(DropColumns),
    ]
}

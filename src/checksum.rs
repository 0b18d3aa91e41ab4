use crate::field::Field2D;
use crate::WorkingPrecision;

pub fn field_checksum(field: &Field2D<WorkingPrecision>) -> WorkingPrecision {
    field.iter().map(|value| value.abs()).sum()
}

pub fn level_index_checksum(field: &Field2D<usize>) -> usize {
    field.iter().sum()
}

//! Caller-owned output destinations for the bound-read path.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::DbStorageError;
use crate::types::{ScalarValue, ValueBinding};

/// A typed destination slot written on every successful row advance.
///
/// Slots are caller-owned: the engine only writes into them, never allocates
/// or frees them, and the slot must outlive the query through the last row
/// advance. Handles are reference-counted and deliberately `!Send`; one slot
/// belongs to one single-threaded engine session.
#[derive(Debug)]
pub struct OutSlot<T: ScalarValue> {
    cell: Rc<RefCell<SlotState<T>>>,
}

#[derive(Debug)]
struct SlotState<T> {
    value: T,
    is_null: bool,
}

impl<T: ScalarValue> OutSlot<T> {
    /// A fresh slot holding the type's default value and a set null flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cell: Rc::new(RefCell::new(SlotState {
                value: T::default(),
                is_null: true,
            })),
        }
    }

    /// Value written by the most recent row advance.
    #[must_use]
    pub fn value(&self) -> T {
        self.cell.borrow().value.clone()
    }

    /// Null flag of the most recently advanced row's column.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.cell.borrow().is_null
    }

    fn store(&self, value: &ValueBinding) -> Result<(), DbStorageError> {
        let mut state = self.cell.borrow_mut();
        if value.is_null() {
            state.value = T::default();
            state.is_null = true;
            return Ok(());
        }
        state.value = T::from_binding(value)?;
        state.is_null = false;
        Ok(())
    }
}

impl<T: ScalarValue> Default for OutSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ScalarValue> Clone for OutSlot<T> {
    // Clones share the underlying cell.
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

/// Tagged handle to a caller-owned destination slot.
#[derive(Debug, Clone)]
pub enum OutDestination {
    Int(OutSlot<i64>),
    Float(OutSlot<f64>),
    Text(OutSlot<String>),
}

impl OutDestination {
    /// Write one result cell into the destination.
    ///
    /// NULL clears the slot to the type's default and sets its null flag; a
    /// non-null value of the wrong kind is a type mismatch.
    pub(crate) fn write(&self, value: &ValueBinding) -> Result<(), DbStorageError> {
        match self {
            OutDestination::Int(slot) => slot.store(value),
            OutDestination::Float(slot) => slot.store(value),
            OutDestination::Text(slot) => slot.store(value),
        }
    }
}

/// Scalar types usable as bound output destinations.
pub trait OutScalar: ScalarValue {
    fn destination(slot: &OutSlot<Self>) -> OutDestination;
}

impl OutScalar for i64 {
    fn destination(slot: &OutSlot<Self>) -> OutDestination {
        OutDestination::Int(slot.clone())
    }
}

impl OutScalar for f64 {
    fn destination(slot: &OutSlot<Self>) -> OutDestination {
        OutDestination::Float(slot.clone())
    }
}

impl OutScalar for String {
    fn destination(slot: &OutSlot<Self>) -> OutDestination {
        OutDestination::Text(slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueKind;

    #[test]
    fn slot_tracks_value_and_null_flag() {
        let slot = OutSlot::<f64>::new();
        assert!(slot.is_null());

        let dest = f64::destination(&slot);
        dest.write(&ValueBinding::Float(2.5)).unwrap();
        assert!(!slot.is_null());
        assert_eq!(slot.value(), 2.5);

        dest.write(&ValueBinding::Null).unwrap();
        assert!(slot.is_null());
        assert_eq!(slot.value(), 0.0);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let slot = OutSlot::<i64>::new();
        let dest = i64::destination(&slot);
        let err = dest.write(&ValueBinding::Text("x".into())).unwrap_err();
        assert!(matches!(
            err,
            DbStorageError::TypeMismatch {
                expected: ValueKind::Int,
                actual: ValueKind::Text,
            }
        ));
    }

    #[test]
    fn clones_share_the_cell() {
        let slot = OutSlot::<String>::new();
        let dest = String::destination(&slot);
        dest.write(&ValueBinding::Text("shared".into())).unwrap();
        assert_eq!(slot.value(), "shared");
    }
}

/// Implements one binary operator family (`Op`, `Op<&Self>`, `OpAssign`,
/// `OpAssign<&Self>`) on top of a free function `fn(&F, &F) -> F`.
#[macro_export]
macro_rules! field_binop {
    ($field:ident, $op:ident, $fn:ident, $assign_op:ident, $assign_fn:ident, $internal:ident) => {
        impl $op<$field> for $field {
            type Output = $field;

            #[inline(always)]
            fn $fn(self, rhs: $field) -> $field {
                $internal(&self, &rhs)
            }
        }

        impl<'b> $op<&'b $field> for $field {
            type Output = $field;

            #[inline(always)]
            fn $fn(self, rhs: &'b $field) -> $field {
                $internal(&self, rhs)
            }
        }

        impl $assign_op for $field {
            #[inline(always)]
            fn $assign_fn(&mut self, rhs: $field) {
                *self = $internal(self, &rhs)
            }
        }

        impl<'b> $assign_op<&'b $field> for $field {
            #[inline(always)]
            fn $assign_fn(&mut self, rhs: &'b $field) {
                *self = $internal(self, rhs)
            }
        }
    };
}

/// macro to implement common arithmetic of field types
///
/// Expects `add_internal`, `sub_internal` and `mul_internal` to be in scope,
/// each with signature `fn(&$field, &$field) -> $field`.
#[macro_export]
macro_rules! field_common {
    ($field:ident) => {
        $crate::field_binop!($field, Add, add, AddAssign, add_assign, add_internal);
        $crate::field_binop!($field, Sub, sub, SubAssign, sub_assign, sub_internal);
        $crate::field_binop!($field, Mul, mul, MulAssign, mul_assign, mul_internal);

        impl<T> Sum<T> for $field
        where
            T: core::borrow::Borrow<Self>,
        {
            fn sum<I: Iterator<Item = T>>(iter: I) -> Self {
                iter.fold(Self::ZERO, |acc, item| acc + item.borrow())
            }
        }

        impl<T> Product<T> for $field
        where
            T: core::borrow::Borrow<Self>,
        {
            fn product<I: Iterator<Item = T>>(iter: I) -> Self {
                iter.fold(Self::ONE, |acc, item| acc * item.borrow())
            }
        }
    };
}

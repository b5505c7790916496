//! Turns a heterogeneous argument list into the three things a call site
//! needs: the ordered `ArgKind` list, the INDEX per-arg suffixes, and the
//! LOG payload (non-constant values only). Built on tuple impls so a call
//! site's whole argument list is captured once, as a single tuple value.

use crate::arg_kind::{ArgKind, ConstantMarker, Loggable};
use crate::error::Result;

/// A single positional argument: knows its wire kind, whether it is a
/// [`ConstantMarker`], and how to encode its value.
pub trait LogArg {
    const KIND: ArgKind;
    const IS_CONSTANT: bool;

    fn encode_value(&self, out: &mut Vec<u8>) -> Result<()>;
}

impl<T: Loggable> LogArg for T {
    const KIND: ArgKind = T::KIND;
    const IS_CONSTANT: bool = false;

    #[inline]
    fn encode_value(&self, out: &mut Vec<u8>) -> Result<()> {
        Loggable::encode(self, out)
    }
}

impl<T: Loggable> LogArg for ConstantMarker<T> {
    const KIND: ArgKind = T::KIND;
    const IS_CONSTANT: bool = true;

    #[inline]
    fn encode_value(&self, out: &mut Vec<u8>) -> Result<()> {
        Loggable::encode(&self.0, out)
    }
}

/// A full positional argument list for one call site, as captured by
/// [`crate::log_record!`] in a tuple.
pub trait LogArgs {
    /// The `ArgKind` of each position, in order.
    fn arg_kinds(&self) -> Vec<ArgKind>;

    /// The INDEX "per-arg suffixes" block: one `is_constant` byte per
    /// position, immediately followed by the encoded value for positions
    /// where it is set.
    fn encode_index_suffixes(&self, out: &mut Vec<u8>) -> Result<()>;

    /// The LOG payload: the encoded value of every position that is NOT
    /// constant, in order.
    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()>;
}

macro_rules! impl_log_args_for_tuple {
    ($($idx:tt => $name:ident),*) => {
        impl<$($name: LogArg),*> LogArgs for ($($name,)*) {
            #[allow(unused_variables, clippy::vec_init_then_push)]
            fn arg_kinds(&self) -> Vec<ArgKind> {
                let mut kinds = Vec::new();
                $( kinds.push(<$name as LogArg>::KIND); )*
                kinds
            }

            #[allow(unused_variables)]
            fn encode_index_suffixes(&self, out: &mut Vec<u8>) -> Result<()> {
                $(
                    out.push(<$name as LogArg>::IS_CONSTANT as u8);
                    if <$name as LogArg>::IS_CONSTANT {
                        self.$idx.encode_value(out)?;
                    }
                )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
                $(
                    if !<$name as LogArg>::IS_CONSTANT {
                        self.$idx.encode_value(out)?;
                    }
                )*
                Ok(())
            }
        }
    };
}

impl LogArgs for () {
    fn arg_kinds(&self) -> Vec<ArgKind> {
        Vec::new()
    }

    fn encode_index_suffixes(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }

    fn encode_payload(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}

impl_log_args_for_tuple!(0 => A);
impl_log_args_for_tuple!(0 => A, 1 => B);
impl_log_args_for_tuple!(0 => A, 1 => B, 2 => C);
impl_log_args_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D);
impl_log_args_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_log_args_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_log_args_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_log_args_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);
impl_log_args_for_tuple!(
    0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I
);
impl_log_args_for_tuple!(
    0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J
);
impl_log_args_for_tuple!(
    0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J,
    10 => K
);
impl_log_args_for_tuple!(
    0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J,
    10 => K, 11 => L
);

//! `DataInput` — Domain-specific data extraction
//!
//! The `DataInput` trait extracts one value from a domain context (e.g. a
//! packet) and returns type-erased `MatchingData`.

use crate::MatchingData;
use std::fmt::Debug;

/// Extracts data from a domain-specific context.
///
/// `DataInput` is the bridge between domain contexts and domain-agnostic
/// matchers.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so compiled matchers can be
/// evaluated from several threads at once.
///
/// # Example
///
/// ```
/// use firesim::{DataInput, MatchingData};
///
/// #[derive(Debug)]
/// struct Flow { proto: &'static str }
///
/// #[derive(Debug)]
/// struct ProtoInput;
///
/// impl DataInput<Flow> for ProtoInput {
///     fn get(&self, ctx: &Flow) -> MatchingData {
///         MatchingData::String(ctx.proto.to_string())
///     }
/// }
///
/// assert_eq!(ProtoInput.get(&Flow { proto: "UDP" }).as_str(), Some("UDP"));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `DataInput<{Ctx}>`",
    label = "this type cannot extract data from `{Ctx}`",
    note = "DataInput<Ctx> extracts data from a specific context type"
)]
pub trait DataInput<Ctx>: Send + Sync + Debug {
    /// Extract data from the given context.
    ///
    /// Returns [`MatchingData::None`] if the requested data is not present.
    fn get(&self, ctx: &Ctx) -> MatchingData;
}

#[diagnostic::do_not_recommend]
impl<Ctx> DataInput<Ctx> for Box<dyn DataInput<Ctx>> {
    fn get(&self, ctx: &Ctx) -> MatchingData {
        (**self).get(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestContext {
        value: String,
    }

    #[derive(Debug)]
    struct ValueInput;

    impl DataInput<TestContext> for ValueInput {
        fn get(&self, ctx: &TestContext) -> MatchingData {
            MatchingData::String(ctx.value.clone())
        }
    }

    #[test]
    fn test_data_input_basic() {
        let ctx = TestContext {
            value: "hello".to_string(),
        };
        assert_eq!(ValueInput.get(&ctx).as_str(), Some("hello"));
    }

    #[test]
    fn test_boxed_data_input_delegates() {
        let boxed: Box<dyn DataInput<TestContext>> = Box::new(ValueInput);
        let ctx = TestContext {
            value: "boxed".to_string(),
        };
        assert_eq!(boxed.get(&ctx).as_str(), Some("boxed"));
    }

    #[test]
    fn test_data_input_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn DataInput<TestContext>>>();
    }
}

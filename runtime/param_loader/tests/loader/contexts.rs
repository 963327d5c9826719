use std::collections::HashMap;

use http::StatusCode;
use param_loader::{
    Accessor, Failure, ParamLoader, ResolutionError,
    context::{
        ParamMap, ParamStore, PlainContext, RequestContext, Resolved, Slot, StructuredContext,
    },
};

fn user_accessor<C: 'static>() -> Accessor<C, String> {
    Accessor::from_fn(|id: &str, _ctx: &C| match id {
        "1" => Ok("Alice".to_owned()),
        _ => Err(Failure::from(ResolutionError::new(StatusCode::NOT_FOUND))),
    })
}

#[tokio::test]
async fn plain_contexts_receive_the_slot_as_a_field() {
    let loader = ParamLoader::new(user_accessor(), Some("foo"), false).unwrap();
    let mut ctx = PlainContext::new();

    let _ = loader.resolve(&mut ctx, "1", "paramName").await;

    let slot = ctx.field::<Resolved<String>>("foo").unwrap();
    assert_eq!(slot.value().map(String::as_str), Some("Alice"));
    assert!(slot.err().is_none());
}

#[tokio::test]
async fn structured_contexts_receive_the_slot_in_their_param_store() {
    let loader = ParamLoader::new(user_accessor(), None, false).unwrap();
    let mut ctx = StructuredContext::new();
    ctx.set_field("user", Slot::new("set by the authentication middleware"));

    let _ = loader.resolve(&mut ctx, "2", "user").await;

    // The pre-existing field is untouched.
    assert_eq!(
        ctx.field::<&str>("user"),
        Some(&"set by the authentication middleware")
    );
    let slot = ctx.get::<Resolved<String>>("user").unwrap();
    assert!(slot.value().is_none());
    assert_eq!(slot.err().unwrap().status_code(), StatusCode::NOT_FOUND);
    assert_eq!(slot.err().unwrap().message(), "Not Found");
}

#[tokio::test]
async fn http_requests_store_params_in_their_extensions() {
    let loader = ParamLoader::new(user_accessor(), None, false).unwrap();
    let mut request = http::Request::new(());

    let _ = loader.resolve(&mut request, "1", "user").await;

    let params = request.extensions().get::<ParamMap>().unwrap();
    let slot = params.get::<Resolved<String>>("user").unwrap();
    assert_eq!(slot.as_result().map(String::as_str), Ok("Alice"));
}

/// A context that prefixes the keys of resolved route parameters.
#[derive(Default)]
struct NamespacedContext {
    entries: HashMap<String, Slot>,
}

impl ParamStore for NamespacedContext {
    fn set_param(&mut self, key: &str, slot: Slot) {
        self.entries.insert(format!("params.{key}"), slot);
    }

    fn get_param(&self, key: &str) -> Option<&Slot> {
        self.entries.get(&format!("params.{key}"))
    }
}

impl RequestContext for NamespacedContext {
    fn param_store(&mut self) -> Option<&mut dyn ParamStore> {
        Some(self)
    }

    fn set_field(&mut self, key: &str, slot: Slot) {
        self.entries.insert(key.to_owned(), slot);
    }
}

#[tokio::test]
async fn custom_contexts_decide_how_params_are_namespaced() {
    let loader = ParamLoader::new(user_accessor(), Some("foo"), true).unwrap();
    let mut ctx = NamespacedContext::default();

    let _ = loader.resolve(&mut ctx, "1", "user").await;

    assert!(ctx.has_param("foo"));
    assert!(!ctx.entries.contains_key("foo"));
    let value = ctx.entries["params.foo"].downcast_ref::<String>().unwrap();
    assert_eq!(value, "Alice");
}

#[tokio::test]
async fn captured_outcomes_can_be_converted_back_into_results() {
    let loader = ParamLoader::new(user_accessor(), None, false).unwrap();
    let mut ctx = StructuredContext::new();

    let _ = loader.resolve(&mut ctx, "1", "found").await;
    let _ = loader.resolve(&mut ctx, "2", "missing").await;

    let found = ctx.get::<Resolved<String>>("found").unwrap().clone();
    assert_eq!(found.into_result(), Ok("Alice".to_owned()));
    let missing = ctx.get::<Resolved<String>>("missing").unwrap().clone();
    assert_eq!(
        missing.into_result(),
        Err(ResolutionError::new(StatusCode::NOT_FOUND))
    );
    // The slot is typed: asking for the wrong type yields nothing.
    assert!(ctx.get::<Resolved<u64>>("found").is_none());
}

use http::StatusCode;
use param_loader::{
    Accessor, Failure, Outcome, ParamLoader, Processing, ResolutionError,
    context::{PlainContext, StructuredContext},
};

use crate::fixtures::spy_accessor;

#[tokio::test]
async fn failures_are_propagated_and_nothing_is_stored() {
    let (accessor, calls) = spy_accessor(|_id: &str, _ctx: &StructuredContext| {
        Outcome::<String>::pending(async { Err::<String, _>("error message") })
    });
    let loader = ParamLoader::new(accessor, Some("foo"), true).unwrap();
    let mut ctx = StructuredContext::new();

    let err = loader
        .handle(&mut ctx, &mut (), |err| err, "paramValue", "paramName")
        .await
        .expect("The error should have been propagated");

    assert_eq!(err.message(), "error message");
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    calls.assert_called_once_with("paramValue");
    assert!(!ctx.has_param("foo"));
    assert!(ctx.params().is_empty());
}

#[tokio::test]
async fn returned_errors_are_propagated_unchanged() {
    let loader = ParamLoader::builder()
        .accessor(Accessor::from_fn(|_id: &str, _ctx: &StructuredContext| {
            Err::<String, _>(ResolutionError::with_message(
                StatusCode::NOT_FOUND,
                "No such user",
            ))
        }))
        .raise_on_error(true)
        .build()
        .unwrap();
    let mut ctx = StructuredContext::new();

    let processing = loader.resolve(&mut ctx, "42", "user").await;

    assert_eq!(
        processing,
        Processing::EarlyReturn(ResolutionError::with_message(
            StatusCode::NOT_FOUND,
            "No such user"
        ))
    );
    assert!(!ctx.has_param("user"));
}

#[tokio::test]
async fn bare_values_are_stored_on_success() {
    let (accessor, calls) = spy_accessor(|_id: &str, _ctx: &PlainContext| {
        Ok::<_, Failure>("payload".to_owned())
    });
    let loader = ParamLoader::new(accessor, Some("foo"), true).unwrap();
    let mut ctx = PlainContext::new();

    let err = loader
        .handle(&mut ctx, &mut (), |err| err, "paramValue", "paramName")
        .await;

    assert!(err.is_none());
    calls.assert_called_once_with("paramValue");
    assert_eq!(ctx.field::<String>("foo").map(String::as_str), Some("payload"));
}

#[tokio::test]
async fn proceed_is_invoked_exactly_once() {
    let loader = ParamLoader::new(
        Accessor::from_fn(|id: &str, _ctx: &PlainContext| match id {
            "ok" => Ok(id.to_owned()),
            _ => Err(Failure::message("Nope")),
        }),
        None,
        true,
    )
    .unwrap();

    for (identifier, should_fail) in [("ok", false), ("ko", true)] {
        let mut ctx = PlainContext::new();
        let mut invocations = Vec::new();
        loader
            .handle(
                &mut ctx,
                &mut (),
                |err| invocations.push(err),
                identifier,
                "param",
            )
            .await;
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].is_some(), should_fail);
        assert_eq!(ctx.has_field("param"), !should_fail);
    }
}

#[tokio::test]
async fn propagated_errors_can_be_turned_into_responses() {
    let loader = ParamLoader::new(
        Accessor::from_fn(|_id: &str, _ctx: &PlainContext| {
            Err::<String, _>(ResolutionError::new(StatusCode::NOT_FOUND))
        }),
        None,
        true,
    )
    .unwrap();
    let mut ctx = PlainContext::new();

    let response = loader
        .handle(
            &mut ctx,
            &mut (),
            |err| err.map(|e| e.to_response()),
            "42",
            "user",
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "Not Found");
}

//! Library integration tests.

use orchard_recipes::RecipeError;

#[test]
fn error_types_are_public() {
    let err = RecipeError::UnhandledStep {
        execution_id: "abc".into(),
        step: "Mystery".into(),
    };
    assert_eq!(
        err.to_string(),
        "Recipe execution with ID abc failed because no matching handler for recipe step 'Mystery' was found"
    );
}

#[test]
fn step_failure_message() {
    let err = RecipeError::StepFailed {
        execution_id: "abc".into(),
        step: "Feature".into(),
        message: "boom".into(),
    };
    assert_eq!(
        err.to_string(),
        "Recipe execution with ID abc failed because the step 'Feature' failed to execute: boom"
    );
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> orchard_recipes::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use orchard_recipes::cli::{Cli, Commands};

    let cli = Cli::parse_from(["orchard", "status", "--json"]);

    if let Commands::Status(args) = cli.command {
        assert!(args.json);
        assert!(args.execution_id.is_none());
    } else {
        panic!("Expected Status command");
    }
}

#[test]
fn execution_ids_are_validated() {
    use orchard_recipes::execution::ExecutionId;

    let generated = ExecutionId::new();
    assert_eq!(generated.as_str().len(), 32);
    assert!(ExecutionId::parse(generated.as_str()).is_ok());
    assert!(matches!(
        ExecutionId::parse("../escape"),
        Err(RecipeError::InvalidExecutionId { .. })
    ));
}

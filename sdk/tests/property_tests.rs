use proptest::prelude::*;
use sdk::errors::{EngineError, ErrorExt};
use sdk::protocol::{ToolName, ToolRequest};
use sdk::types::{MemoryAction, MemoryBankArgs, MemoryCategory, Priority, WorkflowArgs, WorkflowType};

// Hints are static, user-safe strings for every error kind
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "\\PC*") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::ToolNotFound(error_str.clone()),
            EngineError::RecordNotFound { category: "core".into(), name: error_str.clone() },
            EngineError::FileNotFound(std::path::PathBuf::from(&error_str)),
            EngineError::MissingParameter(error_str.clone()),
            EngineError::InvalidParameter(error_str.clone()),
            EngineError::InvalidPath(error_str.clone()),
            EngineError::capability("tsc", error_str.clone()),
            EngineError::LLMProvider(error_str.clone()),
            EngineError::Network(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            if error_str.len() > 8 {
                prop_assert!(!hint.contains(&error_str));
            }
        }
    }
}

// Any string that is not a catalog name is rejected as ToolNotFound
proptest! {
    #[test]
    fn test_unknown_tool_names_rejected(name in "[a-z_]{1,40}") {
        let known = ToolName::ALL.iter().any(|t| t.as_str() == name);
        let result = ToolRequest::from_call(&name, serde_json::json!({}));

        if !known {
            prop_assert!(matches!(result, Err(EngineError::ToolNotFound(ref n)) if *n == name));
        }
    }
}

// Typed requests survive the wire form unchanged
proptest! {
    #[test]
    fn test_memory_bank_request_wire_roundtrip(
        category_idx in 0usize..8,
        file_name in "[a-z0-9-]{1,20}\\.md",
        content in "\\PC{0,200}",
    ) {
        let category = MemoryCategory::ALL[category_idx];
        let args = MemoryBankArgs::write(category, file_name.clone(), content.clone());
        let value = serde_json::to_value(&args).unwrap();

        let request = ToolRequest::from_call("memory_bank_manager", value).unwrap();
        match request {
            ToolRequest::MemoryBank(parsed) => {
                prop_assert_eq!(parsed.action, MemoryAction::Write);
                prop_assert_eq!(parsed.file_category, Some(category));
                prop_assert_eq!(parsed.file_name.as_deref(), Some(file_name.as_str()));
                prop_assert_eq!(parsed.content.as_deref(), Some(content.as_str()));
            }
            other => prop_assert!(false, "unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_workflow_priority_override_roundtrip(
        idx in 0usize..3,
        files in proptest::collection::vec("[a-z]{1,10}\\.ts", 0..5),
    ) {
        let priority = [Priority::P0, Priority::P1, Priority::P2][idx];
        let mut args = WorkflowArgs::new(WorkflowType::FullAnalysis, files.clone());
        args.priority_override = Some(priority);

        let value = serde_json::to_value(&args).unwrap();
        let parsed: WorkflowArgs = serde_json::from_value(value).unwrap();

        prop_assert_eq!(parsed.priority_override, Some(priority));
        prop_assert_eq!(parsed.target_files, files);
    }
}

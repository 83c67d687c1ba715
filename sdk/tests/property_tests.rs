use oopsie_sdk::errors::{EngineError, OopsieErrorExt, StoreError};
use oopsie_sdk::types::{format_due_date, Priority, TaskStatus};
use proptest::prelude::*;

// Every error kind yields a non-empty static hint that never echoes the raw message
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[0-9]{6,12}") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::LLMProvider(error_str.clone()),
            EngineError::Store(StoreError::NotFound(error_str.clone())),
            EngineError::Store(StoreError::Validation(error_str.clone())),
            EngineError::Store(StoreError::UpstreamUnavailable(error_str.clone())),
            EngineError::Store(StoreError::Unknown(error_str.clone())),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

// Display names parse back to the same variant
proptest! {
    #[test]
    fn test_status_and_priority_display_parse_back(
        status_idx in 0usize..3,
        priority_idx in 0usize..4,
    ) {
        let status = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed][status_idx];
        let priority = [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent][priority_idx];

        prop_assert_eq!(status.to_string().parse::<TaskStatus>(), Ok(status));
        prop_assert_eq!(priority.to_string().parse::<Priority>(), Ok(priority));
        prop_assert_eq!(status.to_string().to_uppercase().parse::<TaskStatus>(), Ok(status));
    }
}

// ISO dates are rendered day first
proptest! {
    #[test]
    fn test_format_due_date_reorders_iso_parts(
        year in 1970u32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let iso = format!("{:04}-{:02}-{:02}", year, month, day);
        let display = format_due_date(&iso);
        prop_assert_eq!(display, format!("{:02}/{:02}/{:04}", day, month, year));
    }
}

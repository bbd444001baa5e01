use serde::{Deserialize, Serialize};

pub mod sync_calendar_watches {
    use super::*;

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BatchOutcome {
        pub successful: usize,
        pub failed: usize,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub succeeded_at: String,
        pub watched: BatchOutcome,
        pub unwatched: BatchOutcome,
    }
}

pub mod cleanup_calendar_cache {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub deleted: i64,
    }
}

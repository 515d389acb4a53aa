use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub email: String,
}

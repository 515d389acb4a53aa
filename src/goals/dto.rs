use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GoalQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SetGoalRequest {
    pub email: String,
    pub goal: String,
    pub target_date: Option<String>,
}

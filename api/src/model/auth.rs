use garde::Validate;
use kernel::model::{auth::event::CreateToken, id::UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

impl From<LoginRequest> for CreateToken {
    fn from(value: LoginRequest) -> Self {
        let LoginRequest { email, password } = value;
        Self { email, password }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub user_id: UserId,
    pub access_token: String,
}

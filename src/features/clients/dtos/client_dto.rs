use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::clients::models::Client;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientResponseDto {
    pub id: i64,
    #[schema(example = "Acme Corp")]
    pub name: String,
}

impl From<Client> for ClientResponseDto {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
        }
    }
}

//! Sales opportunities.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/opportunities` | List with search and sorting |
//! | POST | `/api/opportunities` | Create, finding or creating the client |
//! | GET | `/api/opportunities/responsible-names` | Free-text responsible names |
//! | GET | `/api/opportunities/{id}` | Detail with inputs and artifacts |
//! | DELETE | `/api/opportunities/{id}` | Soft delete |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::OpportunityService;

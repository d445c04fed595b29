pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{load_document, load_document_from_str, validate_document};
pub use schema::{endpoint_id, Document, EndpointConfig, NetworkConfig, TenantConfig};
pub use settings::{Direction, Settings, StoreBackend, StoreSettings};

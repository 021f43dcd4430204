pub mod flow;
pub mod ports;
pub mod providers;
pub mod registry;
pub mod user_service;
pub mod validation;

pub use flow::{
    CallbackOutcome, CallbackParams, FlowError, InitiateOutcome, OAuthFlowService,
    OAuthFlowServiceTrait,
};
pub use ports::*;
pub use registry::{ProviderRegistry, RegistryError};
pub use user_service::UserService;
pub use validation::ValidationError;

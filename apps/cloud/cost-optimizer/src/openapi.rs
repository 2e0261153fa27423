//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cloud Cost Optimizer API",
        version = "0.1.0",
        description = "Cost-saving recommendations for cloud resources, generated by Gemini"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/optimizer", api = domain_cost_optimizer::ApiDoc)
    )
)]
pub struct ApiDoc;

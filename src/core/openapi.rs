use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers, models as auth_models};
use crate::features::documents::{dtos as documents_dtos, handlers as documents_handlers};
use crate::features::qa::{dtos as qa_dtos, handlers as qa_handlers};
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::get_me,
        // Documents
        documents_handlers::list_documents,
        documents_handlers::upload_document,
        documents_handlers::get_document,
        documents_handlers::delete_document,
        documents_handlers::download_document,
        // QA
        qa_handlers::ask_question,
        qa_handlers::get_history,
        qa_handlers::get_index_status,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            MessageResponse,
            // Auth
            auth_models::AuthenticatedUser,
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::TokenResponseDto,
            auth_dtos::UserResponseDto,
            // Documents
            documents_dtos::UploadDocumentDto,
            documents_dtos::DocumentResponseDto,
            // QA
            qa_dtos::AskQuestionDto,
            qa_dtos::AnswerResponseDto,
            qa_dtos::QueryLogResponseDto,
            qa_dtos::IndexStatusDto,
        )
    ),
    tags(
        (name = "auth", description = "Registration and bearer tokens"),
        (name = "documents", description = "Document upload and management"),
        (name = "qa", description = "Questions answered from your documents"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Document QA API",
        version = "0.1.0",
        description = "Upload documents and ask questions about them",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

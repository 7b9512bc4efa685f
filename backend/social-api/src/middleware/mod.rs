/// Middleware implementations
pub mod jwt_auth;
pub mod metrics;

// - jwt_auth: session cookie / Bearer validation and user_id extraction
// - metrics: Prometheus metrics collection for all requests
// - Request logging: handled by tracing_actix_web::TracingLogger
// - CORS: handled by actix_cors::Cors

pub use jwt_auth::{JwtAuthMiddleware, UserId, SESSION_COOKIE};
pub use metrics::MetricsMiddleware;

use crate::middleware::auth::current_user_id;
use crate::paper::model::{Paper, PaperRequest, PaperResponse, PaperStatus};
use crate::paper::service::PaperService;
use crate::utils::error::CustomError;
use crate::utils::response;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

fn to_responses(papers: Vec<Paper>) -> Vec<PaperResponse> {
    papers.into_iter().map(PaperResponse::from).collect()
}

/// GET /api/papers
pub async fn get_papers(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let papers = paper_service.list(&owner, None).await?;
    Ok(response::list(&to_responses(papers)))
}

/// GET /api/papers/status/{status}
pub async fn get_papers_by_status(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    status: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let status: PaperStatus = status.parse()?;
    let papers = paper_service.list(&owner, Some(status)).await?;
    Ok(response::list(&to_responses(papers)))
}

/// GET /api/papers/{id}
pub async fn get_paper(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    paper_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let paper = paper_service.get(&owner, &paper_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": PaperResponse::from(paper)
    })))
}

/// POST /api/papers
pub async fn create_paper(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    body: web::Json<PaperRequest>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let paper = paper_service.create(owner, body.into_inner()).await?;
    Ok(response::success(
        StatusCode::CREATED,
        "Paper created successfully",
        PaperResponse::from(paper),
    ))
}

/// PUT /api/papers/{id}
pub async fn update_paper(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    paper_id: web::Path<String>,
    body: web::Json<PaperRequest>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let paper = paper_service
        .update(&owner, &paper_id, body.into_inner())
        .await?;
    Ok(response::success(
        StatusCode::OK,
        "Paper updated successfully",
        PaperResponse::from(paper),
    ))
}

/// DELETE /api/papers/{id}
pub async fn delete_paper(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    paper_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    paper_service.delete(&owner, &paper_id).await?;
    Ok(response::message(StatusCode::OK, "Paper deleted successfully"))
}

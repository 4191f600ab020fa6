use crate::latex::compiler::LatexCompiler;
use crate::latex::generator::{generate_ieee_latex, tex_filename};
use crate::middleware::auth::current_user_id;
use crate::paper::service::PaperService;
use crate::utils::error::CustomError;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, web};
use log::info;
use serde_json::json;

fn attachment(filename: String) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    }
}

/// GET /api/latex/ieee/{paper_id}
pub async fn download_ieee(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    paper_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let paper = paper_service.get(&owner, &paper_id).await?;

    let latex = generate_ieee_latex(&paper);
    Ok(HttpResponse::Ok()
        .content_type("application/x-tex")
        .insert_header(attachment(tex_filename(&paper.title)))
        .body(latex))
}

/// GET /api/latex/preview/ieee/{paper_id}
pub async fn preview_ieee(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    paper_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let paper = paper_service.get(&owner, &paper_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "format": "IEEE",
            "paperId": paper.id.map(|id| id.to_hex()),
            "paperTitle": paper.title,
            "content": generate_ieee_latex(&paper),
        }
    })))
}

/// GET /api/latex/ieee/pdf/{paper_id}
pub async fn download_ieee_pdf(
    req: HttpRequest,
    paper_service: web::Data<PaperService>,
    compiler: web::Data<dyn LatexCompiler>,
    paper_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let owner = current_user_id(&req)?;
    let paper = paper_service.get(&owner, &paper_id).await?;

    let latex = generate_ieee_latex(&paper);
    let result = compiler
        .compile(&latex, &format!("{}_ieee", paper.title))
        .await;
    compiler.sweep_artifacts().await;

    let mut pdf = result?;
    info!("Serving {} to user {}", pdf.filename, owner);
    let bytes = std::mem::take(&mut pdf.bytes);
    let filename = pdf.filename.clone();
    pdf.cleanup().await;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(attachment(filename))
        .body(bytes))
}

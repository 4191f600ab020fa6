use super::controller::{
    delete_account, forgot_password, get_me, login_user, register_user, resend_otp,
    reset_password, update_details, update_password, verify_otp,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register_user))
            .route("/verify-otp", web::post().to(verify_otp))
            .route("/resend-otp", web::post().to(resend_otp))
            .route("/login", web::post().to(login_user))
            .route("/forgotpassword", web::post().to(forgot_password))
            .route("/resetpassword/{token}", web::put().to(reset_password))
            .service(
                web::resource("/me")
                    .wrap(HttpAuthentication::with_fn(verify_token))
                    .route(web::get().to(get_me)),
            )
            .service(
                web::resource("/updatedetails")
                    .wrap(HttpAuthentication::with_fn(verify_token))
                    .route(web::put().to(update_details)),
            )
            .service(
                web::resource("/updatepassword")
                    .wrap(HttpAuthentication::with_fn(verify_token))
                    .route(web::put().to(update_password)),
            )
            .service(
                web::resource("/deleteaccount")
                    .wrap(HttpAuthentication::with_fn(verify_token))
                    .route(web::delete().to(delete_account)),
            ),
    );
}

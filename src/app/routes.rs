use crate::app::error::ErrorBody;
use crate::app::state::AppState;
use crate::domain::model::{EnquiryRequest, SearchFilters};
use crate::utils::error::ScoutError;
use crate::utils::validation::{lenient_float, lenient_int, require_field};
use actix_web::{error, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

type HandlerResult = std::result::Result<HttpResponse, ScoutError>;

/// 數字參數以字串接收，無法解析的值直接忽略而不是拒絕整個搜尋
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityQuery {
    pub location: Option<String>,
    pub radius: Option<String>,
    #[serde(rename = "type")]
    pub facility_type: Option<String>,
    pub min_rating: Option<String>,
    pub limit: Option<String>,
}

impl FacilityQuery {
    fn into_filters(self) -> Result<SearchFilters, ScoutError> {
        let location = self
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ScoutError::ValidationError {
                message: "Location parameter is required".to_string(),
            })?;

        Ok(SearchFilters {
            location,
            radius: self
                .radius
                .as_deref()
                .and_then(lenient_int)
                .and_then(|r| u32::try_from(r).ok())
                .filter(|r| *r > 0),
            facility_type: self.facility_type.filter(|t| !t.trim().is_empty()),
            min_rating: self.min_rating.as_deref().and_then(lenient_float),
            limit: self
                .limit
                .as_deref()
                .and_then(lenient_int)
                .map(SearchFilters::clamp_limit),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryQuery {
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub cities: Vec<String>,
}

pub async fn search_facilities(
    state: web::Data<AppState>,
    query: web::Query<FacilityQuery>,
) -> HandlerResult {
    let filters = query.into_inner().into_filters()?;
    tracing::info!("🔍 Searching facilities near {}", filters.location);

    let facilities = state.facilities.search(&filters).await;
    Ok(HttpResponse::Ok().json(json!({ "facilities": facilities })))
}

pub async fn facility_details(state: web::Data<AppState>, path: web::Path<String>) -> HandlerResult {
    let place_id = path.into_inner();

    match state.facilities.details(&place_id).await {
        Some(facility) => Ok(HttpResponse::Ok().json(json!({ "facility": facility }))),
        None => Err(ScoutError::NotFoundError {
            resource: "Facility".to_string(),
        }),
    }
}

pub async fn draft_enquiry(
    state: web::Data<AppState>,
    body: web::Json<EnquiryRequest>,
) -> HandlerResult {
    let request = body.into_inner();
    require_field("facilityName", &request.facility_name)?;
    require_field("facilityAddress", &request.facility_address)?;
    require_field("userExperience", &request.user_experience)?;

    let facility = match request.facility_id.as_deref() {
        Some(id) if !id.trim().is_empty() => state.facilities.details(id).await,
        _ => None,
    };

    let enquiry = state.enquiries.draft(&request, facility.as_ref()).await;
    Ok(HttpResponse::Ok().json(json!({ "enquiry": enquiry })))
}

pub async fn popular_cities(
    state: web::Data<AppState>,
    query: web::Query<CountryQuery>,
) -> HandlerResult {
    let country_code = query
        .into_inner()
        .country_code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ScoutError::ValidationError {
            message: "Missing countryCode".to_string(),
        })?;

    let cities = state.cities.for_country(&country_code).await?;
    Ok(HttpResponse::Ok().json(json!({ "cities": cities })))
}

pub async fn rank_cities(state: web::Data<AppState>, body: web::Json<RankRequest>) -> HandlerResult {
    let ranking = state.ranker.rank(&body.cities).await?;
    Ok(HttpResponse::Ok().json(ranking))
}

fn query_error(err: error::QueryPayloadError, req: &HttpRequest) -> error::Error {
    tracing::debug!("Rejected query for {}: {}", req.path(), err);
    let body = ErrorBody::new("Invalid query parameters");
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn json_error(err: error::JsonPayloadError, req: &HttpRequest) -> error::Error {
    tracing::debug!("Rejected body for {}: {}", req.path(), err);
    let body = ErrorBody::new("Invalid request body");
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .service(
            web::scope("/api")
                .route("/facilities", web::get().to(search_facilities))
                .route("/facilities/{id}", web::get().to(facility_details))
                .route("/enquiry", web::post().to(draft_enquiry))
                .route("/popular-cities", web::get().to(popular_cities))
                .route("/rank-cities", web::post().to(rank_cities)),
        );
}

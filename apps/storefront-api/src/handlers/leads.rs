//! Contact form leads.

use actix_web::{HttpResponse, web};

use haven_core::domain::{ContactLead, LeadSubmission, PropertyRequirement, ThrottleScope};
use haven_shared::ApiResponse;
use haven_shared::dto::{AcceptedResponse, ContactLeadRequest, PropertyRequirementRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn requirement(req: PropertyRequirementRequest) -> PropertyRequirement {
    PropertyRequirement {
        property_type: req.property_type,
        location: req.location,
        budget_min: req.budget_min,
        budget_max: req.budget_max,
        bedrooms: req.bedrooms,
        bathrooms: req.bathrooms,
        size_min: req.size_min,
        size_max: req.size_max,
        amenities: req.amenities,
        notes: req.notes,
    }
}

fn submission(req: ContactLeadRequest) -> LeadSubmission {
    LeadSubmission {
        name: req.name,
        email: req.email,
        phone: req.phone,
        message: req.message,
        property_id: req.property_id,
        property_title: req.property_title,
        requirement: req.requirement.map(requirement),
    }
}

/// POST /api/leads
pub async fn submit_lead(
    state: web::Data<AppState>,
    body: web::Json<ContactLeadRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let throttle = state.throttle(ThrottleScope::ContactForm, req.email.trim());

    // Rejected submissions still count.
    if !throttle.check() {
        return Err(AppError::too_many_requests(
            "Too many enquiries from this address. Please try again later.",
            throttle.reset_after(),
        ));
    }

    let lead = ContactLead::from_submission(submission(req))?;
    state.leads.submit(&lead).await?;

    tracing::info!(lead_id = %lead.id, property_id = ?lead.property_id, "Lead accepted");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        AcceptedResponse {
            id: lead.id.to_string(),
        },
        "Request Sent Successfully! An agent will contact you shortly.",
    )))
}

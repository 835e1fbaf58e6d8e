// src/content/validators.rs

use chrono::NaiveDate;

use super::models::*;
use crate::common::validation::{is_valid_email, is_valid_slug};
use crate::common::{ValidationResult, Validator};

fn require_text(result: &mut ValidationResult, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        result.add_error(field, "This field is required");
    } else if value.chars().count() > max {
        result.add_error(field, &format!("Must be at most {} characters", max));
    }
}

fn optional_text(result: &mut ValidationResult, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        if value.chars().count() > max {
            result.add_error(field, &format!("Must be at most {} characters", max));
        }
    }
}

pub struct RegionValidator;

impl Validator<CreateRegionRequest> for RegionValidator {
    fn validate(&self, data: &CreateRegionRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_text(&mut result, "name", &data.name, 120);
        if !is_valid_slug(&data.slug) {
            result.add_error("slug", "Slug must be lowercase words separated by hyphens");
        }
        optional_text(&mut result, "description", data.description.as_deref(), 2000);

        result
    }
}

pub struct TourValidator;

impl Validator<CreateTourRequest> for TourValidator {
    fn validate(&self, data: &CreateTourRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_text(&mut result, "title", &data.title, 200);
        if !is_valid_slug(&data.slug) {
            result.add_error("slug", "Slug must be lowercase words separated by hyphens");
        }
        optional_text(&mut result, "summary", data.summary.as_deref(), 500);
        optional_text(&mut result, "description", data.description.as_deref(), 20_000);

        if !(1..=365).contains(&data.duration_days) {
            result.add_error("duration_days", "Duration must be between 1 and 365 days");
        }
        if data.price_cents < 0 {
            result.add_error("price_cents", "Price cannot be negative");
        }

        result
    }
}

impl Validator<UpdateTourRequest> for TourValidator {
    fn validate(&self, data: &UpdateTourRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.region_id.is_none()
            && data.title.is_none()
            && data.summary.is_none()
            && data.description.is_none()
            && data.duration_days.is_none()
            && data.price_cents.is_none()
            && data.published.is_none()
        {
            result.add_error("general", "At least one field must be provided for update");
            return result;
        }

        if let Some(title) = &data.title {
            require_text(&mut result, "title", title, 200);
        }
        optional_text(&mut result, "summary", data.summary.as_deref(), 500);
        optional_text(&mut result, "description", data.description.as_deref(), 20_000);

        if let Some(days) = data.duration_days {
            if !(1..=365).contains(&days) {
                result.add_error("duration_days", "Duration must be between 1 and 365 days");
            }
        }
        if let Some(price) = data.price_cents {
            if price < 0 {
                result.add_error("price_cents", "Price cannot be negative");
            }
        }

        result
    }
}

pub struct BookingValidator;

impl Validator<CreateBookingRequest> for BookingValidator {
    fn validate(&self, data: &CreateBookingRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_text(&mut result, "full_name", &data.full_name, 200);
        if !is_valid_email(data.email.trim()) {
            result.add_error("email", "A valid email address is required");
        }
        optional_text(&mut result, "phone", data.phone.as_deref(), 40);
        optional_text(&mut result, "message", data.message.as_deref(), 5000);

        if !(1..=50).contains(&data.travelers) {
            result.add_error("travelers", "Travelers must be between 1 and 50");
        }

        if let Some(date) = &data.travel_date {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                result.add_error("travel_date", "Travel date must be in YYYY-MM-DD format");
            }
        }

        // Custom trips have no tour to describe them
        if data.tour_id.is_none()
            && data
                .message
                .as_deref()
                .map_or(true, |m| m.trim().is_empty())
        {
            result.add_error("message", "Describe the trip you have in mind");
        }

        result
    }
}

pub fn validate_booking_status(status: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    if !BOOKING_STATUSES.contains(&status) {
        result.add_error(
            "status",
            &format!("Status must be one of: {}", BOOKING_STATUSES.join(", ")),
        );
    }
    result
}

pub struct TestimonialValidator;

impl Validator<CreateTestimonialRequest> for TestimonialValidator {
    fn validate(&self, data: &CreateTestimonialRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        require_text(&mut result, "author_name", &data.author_name, 120);
        require_text(&mut result, "content", &data.content, 2000);
        optional_text(&mut result, "country", data.country.as_deref(), 80);

        if !(1..=5).contains(&data.rating) {
            result.add_error("rating", "Rating must be between 1 and 5");
        }

        result
    }
}

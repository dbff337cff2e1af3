use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Course, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub is_free: Option<bool>,
    pub stock: i32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    /// `0` removes the discount.
    pub discounted_price: Option<i64>,
    pub is_free: Option<bool>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CourseList {
    #[schema(value_type = Vec<Course>)]
    pub items: Vec<Course>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

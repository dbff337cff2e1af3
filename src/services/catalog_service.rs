use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    catalog::Priceable,
    dto::catalog::{
        CourseList, CreateCourseRequest, CreateProductRequest, ProductList, UpdateCourseRequest,
        UpdateProductRequest,
    },
    entity::{
        courses::{ActiveModel as CourseActive, Column as CourseCol, Entity as Courses, Model as CourseModel},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Course, Product},
    response::{ApiResponse, Meta},
    routes::params::{CatalogQuery, CatalogSortBy, SortOrder},
};

pub async fn list_courses(
    db: &DatabaseConnection,
    query: CatalogQuery,
) -> AppResult<ApiResponse<CourseList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(CourseCol::IsActive.eq(true));
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(CourseCol::Title.contains(search));
    }

    let sort_col = match query.sort_by.unwrap_or(CatalogSortBy::CreatedAt) {
        CatalogSortBy::CreatedAt => CourseCol::CreatedAt,
        CatalogSortBy::Price => CourseCol::Price,
        CatalogSortBy::Title => CourseCol::Title,
    };
    let mut finder = Courses::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(db).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?
        .into_iter()
        .map(course_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Courses",
        CourseList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_course(db: &DatabaseConnection, id: Uuid) -> AppResult<ApiResponse<Course>> {
    let course = Courses::find_by_id(id)
        .filter(CourseCol::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Course", course_from_entity(course), None))
}

pub async fn create_course(
    db: &DatabaseConnection,
    user: &AuthUser,
    payload: CreateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    ensure_admin(user)?;
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    let slug = normalize_slug(&payload.slug)?;
    let taken = Courses::find().filter(CourseCol::Slug.eq(slug.as_str())).one(db).await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("slug is already taken".into()));
    }

    let now = Utc::now();
    let course = CourseActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(payload.price),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    audit::record(
        db,
        Some(user.user_id),
        "course_create",
        "courses",
        serde_json::json!({ "course_id": course.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Course created",
        course_from_entity(course),
        Some(Meta::empty()),
    ))
}

pub async fn update_course(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    ensure_admin(user)?;
    let existing = Courses::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;

    let mut active: CourseActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let course = active.update(db).await?;

    audit::record(
        db,
        Some(user.user_id),
        "course_update",
        "courses",
        serde_json::json!({ "course_id": course.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        course_from_entity(course),
        Some(Meta::empty()),
    ))
}

pub async fn list_products(
    db: &DatabaseConnection,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(ProdCol::IsActive.eq(true));
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(ProdCol::Title.contains(search));
    }

    let sort_col = match query.sort_by.unwrap_or(CatalogSortBy::CreatedAt) {
        CatalogSortBy::CreatedAt => ProdCol::CreatedAt,
        CatalogSortBy::Price => ProdCol::Price,
        CatalogSortBy::Title => ProdCol::Title,
    };
    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(db).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_product(db: &DatabaseConnection, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .filter(ProdCol::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product_from_entity(product), None))
}

pub async fn create_product(
    db: &DatabaseConnection,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    if payload.price < 0 || payload.discounted_price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }
    let slug = normalize_slug(&payload.slug)?;
    let taken = Products::find().filter(ProdCol::Slug.eq(slug.as_str())).one(db).await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("slug is already taken".into()));
    }

    let now = Utc::now();
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(payload.price),
        discounted_price: Set(payload.discounted_price.filter(|p| *p > 0)),
        is_free: Set(payload.is_free.unwrap_or(false)),
        stock: Set(payload.stock),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    audit::record(
        db,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;

    let mut active: ProductActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(discounted) = payload.discounted_price {
        if discounted < 0 {
            return Err(AppError::BadRequest("price must not be negative".into()));
        }
        active.discounted_price = Set((discounted > 0).then_some(discounted));
    }
    if let Some(is_free) = payload.is_free {
        active.is_free = Set(is_free);
    }
    if let Some(stock) = payload.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("stock must not be negative".into()));
        }
        active.stock = Set(stock);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(db).await?;

    audit::record(
        db,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

fn normalize_slug(slug: &str) -> AppResult<String> {
    let slug = slug.trim().to_lowercase();
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::BadRequest(
            "slug may only contain letters, digits, '-' and '_'".into(),
        ));
    }
    Ok(slug)
}

fn course_from_entity(model: CourseModel) -> Course {
    Course {
        id: model.id,
        title: model.title,
        slug: model.slug,
        description: model.description,
        price: model.price,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        final_price: model.effective_price(),
        id: model.id,
        title: model.title,
        slug: model.slug,
        description: model.description,
        price: model.price,
        discounted_price: model.discounted_price,
        is_free: model.is_free,
        stock: model.stock,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercased_and_checked() {
        assert_eq!(normalize_slug(" Rust-Basics ").ok().as_deref(), Some("rust-basics"));
        assert!(normalize_slug("rust basics").is_err());
        assert!(normalize_slug("").is_err());
    }
}

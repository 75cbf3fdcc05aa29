//! Development sample data.
//!
//! Wipes users and products, then creates one account per role and the
//! farmer's starter products. Categories and banners are only added when
//! missing.

use axum_helpers::AppError;
use domain_catalog::{CatalogRepository, CatalogService};
use domain_products::{CreateProduct, Product, ProductFilter, ProductRepository, Seller};
use domain_users::{
    Address, Documents, RegisterRequest, Role, User, UserRepository, UserStatus, hash_password,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

pub const SEED_PASSWORD: &str = "password123";

#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    pub email: &'static str,
    pub password: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestCredentials {
    pub farmer: Credential,
    pub customer: Credential,
    pub delivery: Credential,
    pub admin: Credential,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub message: &'static str,
    pub users: u64,
    pub products: u64,
    pub categories: u64,
    pub banners: u64,
    pub test_credentials: TestCredentials,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStatus {
    pub users: u64,
    pub products: u64,
    pub has_data: bool,
}

struct SeedUser {
    full_name: &'static str,
    email: &'static str,
    phone: &'static str,
    role: Role,
    address: Option<(&'static str, &'static str, &'static str)>,
}

const USERS: [SeedUser; 4] = [
    SeedUser {
        full_name: "John Farmer",
        email: "farmer@freshja.com",
        phone: "876-555-0001",
        role: Role::Farmer,
        address: Some(("123 Farm Road", "Kingston", "St. Andrew")),
    },
    SeedUser {
        full_name: "Sarah Customer",
        email: "customer@freshja.com",
        phone: "876-555-0002",
        role: Role::Customer,
        address: Some(("456 Customer Ave", "Montego Bay", "St. James")),
    },
    SeedUser {
        full_name: "Mike Delivery",
        email: "delivery@freshja.com",
        phone: "876-555-0003",
        role: Role::Delivery,
        address: None,
    },
    SeedUser {
        full_name: "Admin User",
        email: "admin@freshja.com",
        phone: "876-555-0004",
        role: Role::Admin,
        address: None,
    },
];

fn credential(email: &'static str) -> Credential {
    Credential {
        email,
        password: SEED_PASSWORD,
    }
}

fn seed_user(seed: &SeedUser, password_hash: &str) -> User {
    let documents = (seed.role == Role::Farmer).then(|| Documents {
        license: "farm_license_001".to_string(),
        trn: "123-456-789".to_string(),
        permit: "farm_permit_001".to_string(),
    });
    let address = seed.address.map(|(street, city, parish)| Address {
        street: Some(street.to_string()),
        city: Some(city.to_string()),
        parish: Some(parish.to_string()),
    });

    let mut user = User::new(
        RegisterRequest {
            full_name: seed.full_name.to_string(),
            email: seed.email.to_string(),
            phone: seed.phone.to_string(),
            password: SEED_PASSWORD.to_string(),
            role: Some(seed.role),
            address,
            documents,
        },
        password_hash.to_string(),
    );
    // Sample farmers skip the approval queue
    user.status = UserStatus::Active;
    user
}

#[allow(clippy::too_many_arguments)]
fn sample(
    name: &str,
    title: &str,
    category: &str,
    price: f64,
    discount_price: Option<f64>,
    description: &str,
    image: &str,
    unit: &str,
    stock: i64,
    rating: f64,
    is_organic: bool,
) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        price,
        discount_price,
        description: Some(description.to_string()),
        grading: Some("A".to_string()),
        images: vec![image.to_string()],
        is_organic,
        rating: Some(rating),
        stock: Some(stock),
        unit: Some(unit.to_string()),
        ..Default::default()
    }
}

pub fn sample_products() -> Vec<CreateProduct> {
    let mut products = vec![
        sample(
            "Fresh Tomatoes",
            "Organic Red Tomatoes",
            "vegetables",
            250.0,
            Some(200.0),
            "Freshly picked organic tomatoes from local farm",
            "tomato.jpg",
            "kg",
            50,
            4.5,
            true,
        ),
        sample(
            "Sweet Bananas",
            "Jamaican Sweet Bananas",
            "fruits",
            150.0,
            None,
            "Sweet ripe bananas from St. Mary",
            "banana.jpg",
            "bunch",
            30,
            4.8,
            true,
        ),
        sample(
            "Callaloo",
            "Fresh Jamaican Callaloo",
            "vegetables",
            100.0,
            None,
            "Nutritious leafy greens perfect for soups and steam",
            "callaloo.jpg",
            "bunch",
            25,
            4.3,
            false,
        ),
        sample(
            "Scotch Bonnet Pepper",
            "Hot Scotch Bonnet Peppers",
            "vegetables",
            300.0,
            None,
            "Authentic Jamaican scotch bonnet peppers with perfect heat",
            "pepper.jpg",
            "lb",
            15,
            4.7,
            true,
        ),
        sample(
            "Ackee",
            "Fresh Jamaican Ackee",
            "fruits",
            400.0,
            None,
            "National fruit of Jamaica, perfect for ackee and saltfish",
            "ackee.jpg",
            "dozen",
            20,
            4.9,
            true,
        ),
        sample(
            "Sweet Potatoes",
            "Jamaican Sweet Potatoes",
            "vegetables",
            180.0,
            Some(150.0),
            "Naturally sweet and nutritious root vegetable",
            "sweet_potato.jpg",
            "kg",
            40,
            4.6,
            true,
        ),
    ];

    for product in &mut products {
        product.is_featured = matches!(product.name.as_str(), "Ackee" | "Fresh Tomatoes");
    }
    products
}

pub struct Seeder<U, P, C>
where
    U: UserRepository,
    P: ProductRepository,
    C: CatalogRepository,
{
    users: Arc<U>,
    products: Arc<P>,
    catalog: CatalogService<C>,
}

impl<U, P, C> Seeder<U, P, C>
where
    U: UserRepository,
    P: ProductRepository,
    C: CatalogRepository,
{
    pub fn new(users: Arc<U>, products: Arc<P>, catalog: Arc<C>) -> Self {
        Self {
            users,
            products,
            catalog: CatalogService::new(catalog),
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<SeedReport, AppError> {
        info!("Starting seed data creation");

        let cleared_users = self.users.delete_all().await?;
        let cleared_products = self.products.delete_all().await?;
        info!(cleared_users, cleared_products, "Cleared existing data");

        let password_hash = hash_password(SEED_PASSWORD)?;
        let users: Vec<User> = USERS
            .iter()
            .map(|seed| seed_user(seed, &password_hash))
            .collect();
        let farmer = Seller {
            id: users[0].id,
            name: USERS[0].full_name,
        };
        let products: Vec<Product> = sample_products()
            .into_iter()
            .map(|input| Product::new(farmer, input))
            .collect();

        let user_count = self.users.insert_many(users).await?;
        let product_count = self.products.insert_many(products).await?;
        let (categories, banners) = self.catalog.ensure_defaults().await?;

        info!(
            users = user_count,
            products = product_count,
            "Seed data created successfully"
        );

        Ok(SeedReport {
            message: "Seed data created successfully",
            users: user_count,
            products: product_count,
            categories,
            banners,
            test_credentials: TestCredentials {
                farmer: credential(USERS[0].email),
                customer: credential(USERS[1].email),
                delivery: credential(USERS[2].email),
                admin: credential(USERS[3].email),
            },
        })
    }

    pub async fn status(&self) -> Result<SeedStatus, AppError> {
        let users = self.users.count().await?;
        let products = self.products.count(ProductFilter::default()).await?;
        Ok(SeedStatus {
            users,
            products,
            has_data: users > 0 && products > 0,
        })
    }
}

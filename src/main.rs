use std::net::SocketAddr;

use dotenvy::dotenv;

use prepforge::logging::init_tracing;
use prepforge::router::init_router;
use prepforge::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "create-admin" {
        handle_create_admin(args).await;
        return;
    }

    if args.len() > 1 && args[1] == "seed" {
        handle_seed().await;
        return;
    }

    init_tracing();

    let state = init_app_state();

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        eprintln!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let app = init_router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();
    println!("🚀 Server running on http://localhost:{}", port);
    println!("📚 Swagger UI available at http://localhost:{}/swagger-ui", port);
    println!("📖 Scalar UI available at http://localhost:{}/scalar", port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

async fn connect_pool() -> sqlx::PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

async fn handle_create_admin(args: Vec<String>) {
    if args.len() != 5 {
        eprintln!("Usage: {} create-admin <name> <email> <password>", args[0]);
        std::process::exit(1);
    }

    let name = &args[2];
    let email = &args[3];
    let password = &args[4];

    let pool = connect_pool().await;

    match prepforge::cli::create_admin(&pool, name, email, password).await {
        Ok(_) => {
            println!("✅ Admin created successfully!");
            println!("   Email: {}", email);
            println!("   Name: {}", name);
        }
        Err(e) => {
            eprintln!("❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed() {
    let pool = connect_pool().await;

    match prepforge::cli::seed_demo_data(&pool).await {
        Ok(_) => println!("✅ Demo data seeded"),
        Err(e) => {
            eprintln!("❌ Error seeding demo data: {}", e);
            std::process::exit(1);
        }
    }
}

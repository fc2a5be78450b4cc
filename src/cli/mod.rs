//! Command-line utilities invoked through the server binary.
//!
//! Admin accounts are created from the CLI only; the registration endpoint
//! always assigns the default role.

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use sqlx::PgPool;
use uuid::Uuid;

use crate::utils::password::hash_password;

pub async fn create_admin(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        anyhow::bail!("A user with email {} already exists", email);
    }

    let hashed = hash_password(password).map_err(|e| anyhow::anyhow!("{}", e.error))?;

    sqlx::query("INSERT INTO users (email, name, password_hash, role) VALUES ($1, $2, $3, 'admin')")
        .bind(email)
        .bind(name)
        .bind(&hashed)
        .execute(pool)
        .await?;

    Ok(())
}

/// Seed a small demo data set: a handful of concepts, a question bank, and
/// a student account.
pub async fn seed_demo_data(pool: &PgPool) -> anyhow::Result<()> {
    let concepts = [
        ("Data Structures", "Core CS"),
        ("Algorithms", "Core CS"),
        ("Operating Systems", "Systems"),
        ("Computer Networks", "Systems"),
        ("Database Management", "Data"),
    ];

    let mut concept_ids = Vec::new();
    for (name, category) in concepts {
        let description: String = Sentence(6..12).fake();
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO concepts (name, category, description)
             VALUES ($1, $2, $3)
             ON CONFLICT (name) DO UPDATE SET category = EXCLUDED.category
             RETURNING id",
        )
        .bind(name)
        .bind(category)
        .bind(description)
        .fetch_one(pool)
        .await?;
        concept_ids.push(id);
    }

    let difficulties = ["easy", "medium", "hard"];
    for (index, concept_id) in concept_ids.iter().enumerate() {
        for n in 0..20 {
            let content: String = Sentence(10..20).fake();
            let options = serde_json::json!([
                { "id": "a", "text": Sentence(3..6).fake::<String>() },
                { "id": "b", "text": Sentence(3..6).fake::<String>() },
                { "id": "c", "text": Sentence(3..6).fake::<String>() },
                { "id": "d", "text": Sentence(3..6).fake::<String>() },
            ]);

            let explanation: String = Sentence(8..14).fake();
            sqlx::query(
                "INSERT INTO questions
                     (content, options, correct_answer, explanation, concept_id,
                      difficulty, source, year_appeared)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(&content)
            .bind(&options)
            .bind("a")
            .bind(explanation)
            .bind(concept_id)
            .bind(difficulties[n % difficulties.len()])
            .bind("Seeded question bank")
            .bind(2018 + ((index + n) % 8) as i32)
            .execute(pool)
            .await?;
        }
    }

    let student_email: String = SafeEmail().fake();
    let student_name: String = Name().fake();
    let hashed = hash_password("student-password").map_err(|e| anyhow::anyhow!("{}", e.error))?;

    sqlx::query(
        "INSERT INTO users (email, name, password_hash, role)
         VALUES ($1, $2, $3, 'student')
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(&student_email)
    .bind(&student_name)
    .bind(&hashed)
    .execute(pool)
    .await?;

    Ok(())
}

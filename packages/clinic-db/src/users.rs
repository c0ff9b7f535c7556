//! Acesso a usuários e verificação de credenciais

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{NewUser, User, UserProfile};

/// Cadastra um usuário. E-mail duplicado resulta em `DbError::Conflict`.
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> DbResult<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, password, name, role, avatar, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&new_user.email)
    .bind(&new_user.password)
    .bind(&new_user.name)
    .bind(new_user.role.to_string())
    .bind(&new_user.avatar)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    debug!(user_id = %user.id, role = %user.role, "Usuário cadastrado");
    Ok(user)
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Compara a senha informada com a armazenada (igualdade exata).
///
/// E-mail desconhecido e senha incorreta produzem o mesmo `DbError::Unauthorized`.
pub async fn verify_credentials(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> DbResult<UserProfile> {
    match find_user_by_email(pool, email).await? {
        Some(user) if user.password == password => {
            debug!(user_id = %user.id, "Credenciais verificadas");
            Ok(user.into())
        }
        Some(_) => {
            warn!(email, "Senha incorreta");
            Err(DbError::Unauthorized)
        }
        None => {
            warn!(email, "E-mail não cadastrado");
            Err(DbError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::testing::{doctor, temp_pool};
    use anyhow::Result;

    #[tokio::test]
    async fn test_login_returns_profile_for_valid_credentials() -> Result<()> {
        let (_dir, pool) = temp_pool().await?;
        create_user(&pool, doctor()).await?;

        let profile = verify_credentials(&pool, "doctor@clinic.com", "password123").await?;
        assert_eq!(profile.role, Role::Doctor);
        assert_eq!(profile.name, "李華醫師");

        let json = serde_json::to_value(&profile)?;
        assert!(json.get("password").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_unauthorized() -> Result<()> {
        let (_dir, pool) = temp_pool().await?;
        create_user(&pool, doctor()).await?;

        let wrong = verify_credentials(&pool, "doctor@clinic.com", "nope").await;
        assert!(matches!(wrong, Err(DbError::Unauthorized)));

        let unknown = verify_credentials(&pool, "ghost@clinic.com", "password123").await;
        assert!(matches!(unknown, Err(DbError::Unauthorized)));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() -> Result<()> {
        let (_dir, pool) = temp_pool().await?;
        create_user(&pool, doctor()).await?;

        let err = create_user(&pool, doctor()).await.unwrap_err();
        assert!(err.is_conflict(), "esperado conflito, recebido {:?}", err);

        Ok(())
    }

    #[tokio::test]
    async fn test_password_comparison_is_exact() -> Result<()> {
        let (_dir, pool) = temp_pool().await?;
        create_user(&pool, doctor()).await?;

        let padded = verify_credentials(&pool, "doctor@clinic.com", "password123 ").await;
        assert!(matches!(padded, Err(DbError::Unauthorized)));

        Ok(())
    }
}

use crate::entities::{
    subscription_plan_entity as subscription_plans, user_address_entity as user_addresses,
    user_entity as users, user_subscription_entity as user_subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::subscription_service::period_end;
use crate::utils::{JwtService, hash_password, validate_email, validate_password, verify_password};
use chrono::Utc;
use sea_orm::sea_query::ExprTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

const FREE_PLAN_NAME: &str = "Grátis";

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// Creates the account, its primary address and the default free-plan
    /// subscription in one transaction.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        validate_email(&request.email)?;
        validate_password(&request.password)?;
        if request.username.trim().len() < 3 {
            return Err(AppError::ValidationError(
                "Nome de usuário deve ter pelo menos 3 caracteres".to_string(),
            ));
        }
        if request.full_name.trim().len() < 2 {
            return Err(AppError::ValidationError(
                "Nome completo é obrigatório".to_string(),
            ));
        }
        if request.city.trim().len() < 2 {
            return Err(AppError::ValidationError("Cidade é obrigatória".to_string()));
        }
        if request.state.trim().len() < 2 {
            return Err(AppError::ValidationError("Estado é obrigatório".to_string()));
        }

        let existing = users::Entity::find()
            .filter(
                users::Column::Email
                    .eq(request.email.clone())
                    .or(users::Column::Username.eq(request.username.clone())),
            )
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Email ou nome de usuário já existe".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(request.email.trim().to_lowercase()),
            password_hash: Set(password_hash),
            username: Set(request.username.trim().to_string()),
            full_name: Set(request.full_name.trim().to_string()),
            phone: Set(request.phone.clone()),
            user_type: Set(request.user_type.clone()),
            status: Set(UserStatus::Active),
            is_admin: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
        }
        .insert(&txn)
        .await?;

        user_addresses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            city: Set(request.city.trim().to_string()),
            state: Set(request.state.trim().to_uppercase()),
            is_primary: Set(true),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        // Everyone starts on the free plan
        let free_plan = subscription_plans::Entity::find()
            .filter(subscription_plans::Column::Name.eq(FREE_PLAN_NAME))
            .one(&txn)
            .await?;
        match free_plan {
            Some(plan) => {
                user_subscriptions::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user.id),
                    plan_id: Set(plan.id),
                    status: Set(SubscriptionStatus::Active),
                    current_period_start: Set(now),
                    current_period_end: Set(period_end(now)),
                    created_at: Set(now),
                }
                .insert(&txn)
                .await?;
            }
            None => {
                // Quota checks fall back to the free limit anyway
                log::warn!("Free plan '{FREE_PLAN_NAME}' missing; user {} starts without a subscription", user.id);
            }
        }

        txn.commit().await?;

        log::info!("Registered user {} ({})", user.id, user.username);

        let auth_user = AuthUser::from(&user);
        let token = self.jwt_service.issue_token(&auth_user)?;

        Ok(AuthResponse {
            user: UserResponse::from_model(
                user,
                Some(request.city.trim().to_string()),
                Some(request.state.trim().to_uppercase()),
            ),
            token,
            expires_in: self.jwt_service.get_expires_in(),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(request.email.trim().to_lowercase()))
            .one(&self.pool)
            .await?;

        // Same message for unknown email and wrong password
        let user =
            user.ok_or_else(|| AppError::AuthError("Credenciais inválidas".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Credenciais inválidas".to_string()));
        }

        let mut model = user.clone().into_active_model();
        model.last_login_at = Set(Some(Utc::now()));
        let user = model.update(&self.pool).await?;

        let address = user_addresses::Entity::find()
            .filter(user_addresses::Column::UserId.eq(user.id))
            .filter(user_addresses::Column::IsPrimary.eq(true))
            .one(&self.pool)
            .await?;

        let auth_user = AuthUser::from(&user);
        let token = self.jwt_service.issue_token(&auth_user)?;

        let (city, state) = match address {
            Some(address) => (Some(address.city), Some(address.state)),
            None => (None, None),
        };

        Ok(AuthResponse {
            user: UserResponse::from_model(user, city, state),
            token,
            expires_in: self.jwt_service.get_expires_in(),
        })
    }
}

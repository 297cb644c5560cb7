use std::sync::Arc;

use uuid::Uuid;

use super::ServiceResult;
use crate::{
    auth::{AuthError, Password, PasswordHasher, TokenIssuer},
    authz::{Action, Caller, Resource, authorize},
    db::DbPool,
    models::{CreateUser, LoginRequest, NewUser, Role, User, normalize_email},
};

/// A freshly issued session token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Registration, login and token handling.
#[derive(Clone)]
pub struct AuthService {
    db: Arc<DbPool>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(db: Arc<DbPool>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self { db, hasher, tokens }
    }

    /// Create an account and sign it in.
    ///
    /// Anyone may register as a student or faculty member. Registering an
    /// admin requires an admin caller.
    pub async fn register(
        &self,
        caller: Option<&Caller>,
        input: CreateUser,
    ) -> ServiceResult<Session> {
        let role = input.role.unwrap_or_default();
        authorize(caller, Action::Create, &Resource::Registration { role })?;

        let user = create_account(&self.db, &self.hasher, input, role).await?;
        self.session(user)
    }

    /// Verify credentials. Unknown emails and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn login(&self, input: LoginRequest) -> ServiceResult<Session> {
        let password = Password::new(&input.password)?;
        let Some(user) = self
            .db
            .users()
            .get_by_email(&normalize_email(&input.email))
            .await?
        else {
            self.hasher.verify_unknown(password).await?;
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = self
            .hasher
            .verify_blocking(password, user.password_hash.clone())
            .await?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active {
            return Err(AuthError::InactiveAccount.into());
        }

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        self.session(user)
    }

    pub async fn profile(&self, caller: &Caller) -> ServiceResult<User> {
        self.active_user(caller.id).await
    }

    /// Issue a new token for the caller, picking up any role change.
    pub async fn refresh(&self, caller: &Caller) -> ServiceResult<Session> {
        let user = self.active_user(caller.id).await?;
        self.session(user)
    }

    /// Turn a session token into a caller.
    ///
    /// The role comes from the stored account, not the token, so a demoted
    /// or deactivated user loses access without waiting for expiry.
    pub async fn resolve_caller(&self, token: &str) -> ServiceResult<Caller> {
        let claims = self.tokens.verify(token)?;
        let user = self.active_user(claims.sub).await?;
        Ok(Caller::new(user.id, user.role))
    }

    /// Create an admin account with no caller to check. Only the command
    /// line reaches this, to bootstrap the first admin.
    pub async fn bootstrap_admin(&self, input: CreateUser) -> ServiceResult<User> {
        create_account(&self.db, &self.hasher, input, Role::Admin).await
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    async fn active_user(&self, id: Uuid) -> ServiceResult<User> {
        match self.db.users().get_by_id(id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::UnknownUser.into()),
        }
    }

    fn session(&self, user: User) -> ServiceResult<Session> {
        let token = self.tokens.issue(user.id, user.role)?;
        Ok(Session { token, user })
    }
}

/// Hash the password and store a new account with a normalized email.
pub(crate) async fn create_account(
    db: &DbPool,
    hasher: &PasswordHasher,
    input: CreateUser,
    role: Role,
) -> ServiceResult<User> {
    let password = Password::new(&input.password)?;
    let password_hash = hasher.hash_blocking(password).await?;

    let user = db
        .users()
        .create(NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            email: normalize_email(&input.email),
            password_hash,
            role,
            phone: input.phone,
            avatar: input.avatar,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "Account created");
    Ok(user)
}

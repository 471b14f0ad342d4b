use resort_core::ServiceError;
use tracing::info;

use crate::model::{Account, AccountRole};
use crate::store_impls::{account_key, hash_password};

use super::FrontDeskService;

pub struct CreateAccountInput {
    pub role: AccountRole,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

impl FrontDeskService {
    /// Accounts of one role, or every role (admins, staff, customers) when
    /// `role` is `None`. Newest first within a role. Hashes are stripped.
    pub fn list_accounts(&self, role: Option<AccountRole>) -> Result<Vec<Account>, ServiceError> {
        let roles: &[AccountRole] = match &role {
            Some(r) => std::slice::from_ref(r),
            None => &AccountRole::ALL,
        };

        let mut out = Vec::new();
        for role in roles {
            let mut accounts = self.accounts.list_under(&format!("{}:", role.as_str()))?;
            accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            out.extend(accounts.into_iter().map(Account::redacted));
        }
        Ok(out)
    }

    pub fn get_account(&self, role: AccountRole, id: &str) -> Result<Account, ServiceError> {
        Ok(self.accounts.get_or_err(&account_key(role, id))?.redacted())
    }

    /// Only customer accounts can be removed from the console.
    pub fn delete_account(&self, role: AccountRole, id: &str) -> Result<(), ServiceError> {
        if role != AccountRole::User {
            return Err(ServiceError::PermissionDenied(
                "You can only delete customer accounts. Staff and admin accounts require higher permissions."
                    .into(),
            ));
        }
        self.accounts.delete(&account_key(role, id))?;
        info!("customer account {} deleted", id);
        Ok(())
    }

    /// Create an account with an argon2id password hash. Emails are unique
    /// within a role.
    pub fn create_account(&self, input: CreateAccountInput) -> Result<Account, ServiceError> {
        let email = input.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(ServiceError::Validation(format!("invalid email '{}'", input.email)));
        }
        if input.password.is_empty() {
            return Err(ServiceError::Validation("password is required".into()));
        }
        if self.find_account_by_email(input.role, &email)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "{} account '{}' already exists",
                input.role, email
            )));
        }

        let password_hash = hash_password(&input.password).map_err(ServiceError::Internal)?;
        let account = self.accounts.save_new(Account {
            id: String::new(),
            role: input.role,
            full_name: input.full_name,
            email,
            phone: input.phone,
            password_hash: Some(password_hash),
            created_at: None,
            updated_at: None,
        })?;
        info!("{} account {} created", account.role, account.id);
        Ok(account.redacted())
    }

    /// Lookup with the hash intact, for credential checks.
    pub(crate) fn find_account_by_email(
        &self,
        role: AccountRole,
        email: &str,
    ) -> Result<Option<Account>, ServiceError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .accounts
            .list_under(&format!("{}:", role.as_str()))?
            .into_iter()
            .find(|a| a.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_service;

    fn input(role: AccountRole, name: &str, email: &str) -> CreateAccountInput {
        CreateAccountInput {
            role,
            full_name: name.into(),
            email: email.into(),
            phone: None,
            password: "pw-123456".into(),
        }
    }

    #[test]
    fn list_all_orders_roles_admin_staff_user() {
        let svc = test_service();
        svc.create_account(input(AccountRole::User, "Guest One", "g1@mail.test")).unwrap();
        svc.create_account(input(AccountRole::Staff, "Desk One", "d1@resort.test")).unwrap();
        svc.create_account(input(AccountRole::Admin, "Boss", "boss@resort.test")).unwrap();

        let all = svc.list_accounts(None).unwrap();
        let roles: Vec<_> = all.iter().map(|a| a.role).collect();
        assert_eq!(roles, vec![AccountRole::Admin, AccountRole::Staff, AccountRole::User]);
        assert!(all.iter().all(|a| a.password_hash.is_none()));

        let users = svc.list_accounts(Some(AccountRole::User)).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "g1@mail.test");
    }

    #[test]
    fn only_customers_can_be_deleted() {
        let svc = test_service();
        let guest = svc.create_account(input(AccountRole::User, "Guest", "g@mail.test")).unwrap();
        let staff = svc.create_account(input(AccountRole::Staff, "Desk", "d@resort.test")).unwrap();

        assert!(matches!(
            svc.delete_account(AccountRole::Staff, &staff.id),
            Err(ServiceError::PermissionDenied(_))
        ));
        assert!(svc.get_account(AccountRole::Staff, &staff.id).is_ok());

        svc.delete_account(AccountRole::User, &guest.id).unwrap();
        assert!(matches!(
            svc.get_account(AccountRole::User, &guest.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn create_validates_and_rejects_duplicates() {
        let svc = test_service();
        assert!(matches!(
            svc.create_account(input(AccountRole::Staff, "X", "no-at-sign")),
            Err(ServiceError::Validation(_))
        ));
        svc.create_account(input(AccountRole::Staff, "X", "Desk@Resort.test")).unwrap();
        assert!(matches!(
            svc.create_account(input(AccountRole::Staff, "Y", "desk@resort.test ")),
            Err(ServiceError::Conflict(_))
        ));
        // Same email under another role is a different account.
        svc.create_account(input(AccountRole::User, "Z", "desk@resort.test")).unwrap();
    }
}

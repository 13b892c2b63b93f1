use super::validation::optional;
use super::{Actor, Editable, EntityManager, Resource, Validate, ValidationError};
use crate::entities::{ActionKind, Profile, Role};
use crate::error::AppError;
use crate::functions::{ProvisionRequest, UserProvisioner};
use crate::identity::Identity;
use crate::locale;
use crate::policy::{self, EntityKind, Operation};
use crate::search::Searchable;
use crate::store::Query;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use uuid::Uuid;

pub struct Users;

/// Admin form for a new login. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl NewUserForm {
    fn into_request(self) -> Result<ProvisionRequest, ValidationError> {
        let role = self.role.ok_or(ValidationError::MissingFields)?;
        if [&self.email, &self.password, &self.full_name]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ValidationError::MissingFields);
        }
        Ok(ProvisionRequest {
            email: self.email.trim().to_string(),
            password: self.password,
            full_name: self.full_name.trim().to_string(),
            role,
        })
    }
}

/// Profile edits. The role is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserForm {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub region_id: Option<Uuid>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

impl Validate for UserForm {
    fn validate(&self) -> Result<(), ValidationError> {
        super::validation::required("full_name", &self.full_name)
    }
}

impl Searchable for Profile {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.full_name.as_str()),
            Cow::Borrowed(locale::role_label(self.role)),
        ];
        fields.extend(self.phone.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Resource for Users {
    const ENTITY: EntityKind = EntityKind::Users;
    type Row = Profile;

    fn list_query() -> Query {
        Query::table(Self::ENTITY.table()).order_desc("created_at")
    }
}

impl Editable for Users {
    type Form = UserForm;

    fn update_patch(form: &UserForm) -> Value {
        json!({
            "full_name": form.full_name.trim(),
            "phone": optional(&form.phone),
            "region_id": form.region_id,
            "is_active": form.is_active,
        })
    }
}

impl EntityManager<Users> {
    /// New logins go through the privileged function; the row store never
    /// sees a direct insert. The audit entry records email and role only.
    pub async fn provision(
        &self,
        actor: &Actor,
        provisioner: &dyn UserProvisioner,
        form: NewUserForm,
    ) -> Result<Identity, AppError> {
        policy::authorize(actor.role(), EntityKind::Users, Operation::Create)?;
        let request = form.into_request()?;

        let identity = provisioner
            .create_user(&actor.access_token, &request)
            .await?;

        metrics::gauge!("aidboard_rows_total", "table" => EntityKind::Users.table()).increment(1.0);
        self.record(
            actor,
            ActionKind::Create,
            identity.id,
            Some(json!({ "email": request.email, "role": request.role })),
        )
        .await;
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_new_user_field_is_required() {
        let complete = NewUserForm {
            email: "a@example.org".into(),
            password: "secret".into(),
            full_name: "Amal".into(),
            role: Some(Role::Employee),
        };
        assert!(complete.clone().into_request().is_ok());

        let no_role = NewUserForm {
            role: None,
            ..complete.clone()
        };
        assert_eq!(no_role.into_request(), Err(ValidationError::MissingFields));

        let blank_name = NewUserForm {
            full_name: " ".into(),
            ..complete
        };
        assert_eq!(blank_name.into_request(), Err(ValidationError::MissingFields));
    }
}

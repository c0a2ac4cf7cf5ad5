use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, SupplierId};

/// Input shape for supplier registration and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
}

/// A registered supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    contact: String,
    email: String,
    phone: String,
}

impl Supplier {
    pub fn new(id: SupplierId, input: NewSupplier) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }
        Ok(Self {
            id,
            name: input.name,
            contact: input.contact,
            email: input.email,
            phone: input.phone,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn update(&mut self, input: NewSupplier) -> DomainResult<()> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }
        self.name = input.name;
        self.contact = input.contact;
        self.email = input.email;
        self.phone = input.phone;
        Ok(())
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let err = Supplier::new(
            SupplierId::new(),
            NewSupplier {
                name: "  ".to_string(),
                contact: String::new(),
                email: String::new(),
                phone: String::new(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}

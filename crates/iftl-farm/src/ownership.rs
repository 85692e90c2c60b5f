//! Single-owner access control.
//!
//! Privileged operations do not consult a global owner. Callers first obtain
//! an [`OwnerCap`] from [`Ownable::authorize`], which only succeeds for the
//! current owner, and pass it to the privileged function. Since the cap has
//! a private field, this module is the only place one can be minted.

use iftl_core::error::AccessError;
use iftl_core::event::{Event, EventLog};
use iftl_core::types::Address;

/// Proof that the holder was the owner when it was issued.
#[derive(Debug)]
pub struct OwnerCap {
    _sealed: (),
}

/// Stores the current owner and issues [`OwnerCap`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Fails with [`AccessError::ZeroAddress`] for the zero address.
    pub fn new(owner: Address) -> Result<Self, AccessError> {
        if owner.is_zero() {
            return Err(AccessError::ZeroAddress);
        }
        Ok(Self { owner })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Issue a capability if `caller` is the current owner.
    pub fn authorize(&self, caller: &Address) -> Result<OwnerCap, AccessError> {
        if *caller != self.owner {
            return Err(AccessError::NotOwner {
                caller: *caller,
                owner: self.owner,
            });
        }
        Ok(OwnerCap { _sealed: () })
    }

    /// Hand ownership to `new_owner`. Only the current owner may do this.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
        events: &mut EventLog,
    ) -> Result<(), AccessError> {
        self.authorize(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::ZeroAddress);
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        tracing::info!(%previous, new = %new_owner, "ownership transferred");
        events.emit(Event::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 20])
    }

    #[test]
    fn owner_is_authorized() {
        let o = Ownable::new(addr(1)).unwrap();
        assert!(o.authorize(&addr(1)).is_ok());
    }

    #[test]
    fn stranger_is_rejected() {
        let o = Ownable::new(addr(1)).unwrap();
        assert_eq!(
            o.authorize(&addr(2)).unwrap_err(),
            AccessError::NotOwner { caller: addr(2), owner: addr(1) }
        );
    }

    #[test]
    fn zero_owner_rejected() {
        assert_eq!(Ownable::new(Address::ZERO), Err(AccessError::ZeroAddress));
    }

    #[test]
    fn transfer_moves_authority_and_emits() {
        let mut o = Ownable::new(addr(1)).unwrap();
        let mut log = EventLog::new();
        o.transfer_ownership(&addr(1), addr(2), &mut log).unwrap();

        assert_eq!(o.owner(), addr(2));
        assert!(o.authorize(&addr(1)).is_err());
        assert!(o.authorize(&addr(2)).is_ok());
        assert_eq!(
            log.events(),
            &[Event::OwnershipTransferred { previous: addr(1), new: addr(2) }]
        );
    }

    #[test]
    fn transfer_by_stranger_changes_nothing() {
        let mut o = Ownable::new(addr(1)).unwrap();
        let mut log = EventLog::new();
        assert!(o.transfer_ownership(&addr(3), addr(3), &mut log).is_err());
        assert_eq!(o.owner(), addr(1));
        assert!(log.is_empty());
    }

    #[test]
    fn transfer_to_zero_rejected() {
        let mut o = Ownable::new(addr(1)).unwrap();
        let mut log = EventLog::new();
        assert_eq!(
            o.transfer_ownership(&addr(1), Address::ZERO, &mut log),
            Err(AccessError::ZeroAddress)
        );
        assert_eq!(o.owner(), addr(1));
    }
}

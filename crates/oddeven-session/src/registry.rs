//! The two role slots.

use oddeven_protocol::Role;
use oddeven_transport::ConnectionId;

use crate::SessionError;

/// Maps connections to the `Odd` and `Even` slots.
///
/// Seating is first come, first served: the first connection gets `Odd`,
/// the second `Even`, everyone after that is turned away until a slot
/// frees up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRegistry {
    odd: Option<ConnectionId>,
    even: Option<ConnectionId>,
}

impl PlayerRegistry {
    /// Creates a registry with both slots empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats `conn` in the first free slot.
    ///
    /// A connection that already holds a slot keeps it and gets its role
    /// back, so a slot is never held twice by the same identity.
    ///
    /// # Errors
    /// Returns [`SessionError::Full`] when both slots are taken. The
    /// registry is not modified.
    pub fn assign(&mut self, conn: ConnectionId) -> Result<Role, SessionError> {
        if let Some(role) = self.role_of(conn) {
            return Ok(role);
        }
        if self.odd.is_none() {
            self.odd = Some(conn);
            Ok(Role::Odd)
        } else if self.even.is_none() {
            self.even = Some(conn);
            Ok(Role::Even)
        } else {
            Err(SessionError::Full)
        }
    }

    /// Puts `conn` in the `role` slot, replacing whoever held it.
    ///
    /// Only the rematch role swap uses this; it overwrites both slots in
    /// one go, so the slots never end up holding the same identity.
    pub fn assign_with_role(&mut self, conn: ConnectionId, role: Role) {
        match role {
            Role::Odd => self.odd = Some(conn),
            Role::Even => self.even = Some(conn),
        }
    }

    /// Frees the slot held by `conn`. Returns the role it held, if any.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<Role> {
        let role = self.role_of(conn)?;
        match role {
            Role::Odd => self.odd = None,
            Role::Even => self.even = None,
        }
        Some(role)
    }

    /// Empties both slots.
    pub fn clear(&mut self) {
        self.odd = None;
        self.even = None;
    }

    /// Returns `true` if `conn` holds a slot.
    pub fn has_player(&self, conn: ConnectionId) -> bool {
        self.role_of(conn).is_some()
    }

    /// Returns the role held by `conn`.
    pub fn role_of(&self, conn: ConnectionId) -> Option<Role> {
        if self.odd == Some(conn) {
            Some(Role::Odd)
        } else if self.even == Some(conn) {
            Some(Role::Even)
        } else {
            None
        }
    }

    /// Returns the connection seated in `role`.
    pub fn holder(&self, role: Role) -> Option<ConnectionId> {
        match role {
            Role::Odd => self.odd,
            Role::Even => self.even,
        }
    }

    /// Returns both seated connections as `(odd, even)` if both slots are
    /// filled.
    pub fn pair(&self) -> Option<(ConnectionId, ConnectionId)> {
        Some((self.odd?, self.even?))
    }

    /// Returns `true` when both slots are filled. Play only happens then.
    pub fn both_present(&self) -> bool {
        self.pair().is_some()
    }

    /// Returns how many slots are filled.
    pub fn seated(&self) -> usize {
        usize::from(self.odd.is_some()) + usize::from(self.even.is_some())
    }
}

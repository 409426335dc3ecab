//! Must-connect-before-operate precondition

use odoo_rpc_client::RpcConnection;

use crate::error::{GatewayError, GatewayResult};
use crate::operation::Operation;

/// Checks the connection state before an operation touches the network.
///
/// Stateless: it reads the connection's current status on every check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionGuard;

impl ConnectionGuard {
    pub fn check(&self, operation: Operation, connection: &RpcConnection) -> GatewayResult<()> {
        if operation.requires_connection() && !connection.is_connected() {
            return Err(GatewayError::NotConnected);
        }
        Ok(())
    }
}

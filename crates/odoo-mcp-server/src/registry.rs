//! Operation dispatcher shared by every surface

use std::sync::Arc;

use odoo_rpc_client::{ConnectionParams, PartialConnectionParams, RpcConnection};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::arguments::Arguments;
use crate::envelope::{Envelope, Payload, normalize};
use crate::error::{GatewayError, GatewayResult};
use crate::guard::ConnectionGuard;
use crate::handlers;
use crate::operation::{Operation, OperationDescriptor};

/// Fixed table of operations bound to one connection.
///
/// Built once; `dispatch` never raises, every outcome is an [`Envelope`].
pub struct OperationRegistry {
    connection: Arc<RpcConnection>,
    descriptors: Vec<OperationDescriptor>,
    guard: ConnectionGuard,
    connection_defaults: PartialConnectionParams,
}

impl OperationRegistry {
    /// Registry whose `connect` falls back to the `ODOO_*` environment variables
    pub fn new(connection: Arc<RpcConnection>) -> Self {
        Self::with_connection_defaults(connection, PartialConnectionParams::from_env())
    }

    pub fn with_connection_defaults(
        connection: Arc<RpcConnection>,
        connection_defaults: PartialConnectionParams,
    ) -> Self {
        Self {
            connection,
            descriptors: Operation::ALL
                .into_iter()
                .map(OperationDescriptor::of)
                .collect(),
            guard: ConnectionGuard,
            connection_defaults,
        }
    }

    pub fn connection(&self) -> &Arc<RpcConnection> {
        &self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn descriptors(&self) -> &[OperationDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, operation: Operation) -> Option<&OperationDescriptor> {
        self.descriptors.iter().find(|d| d.operation == operation)
    }

    /// Resolve `name` and run it; unknown names yield `UnknownOperation`
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Envelope {
        match Operation::from_name(name) {
            Some(operation) => self.execute(operation, arguments).await,
            None => {
                warn!(operation = %name, "Unknown operation");
                normalize(Err(GatewayError::UnknownOperation(name.to_string())))
            }
        }
    }

    pub async fn execute(&self, operation: Operation, arguments: Value) -> Envelope {
        debug!(%operation, "Dispatching operation");
        let result = self.run(operation, arguments).await;

        if let Err(e) = &result {
            if e.kind().is_client_error() {
                warn!(%operation, kind = %e.kind(), "Operation rejected: {}", e);
            } else {
                error!(%operation, kind = %e.kind(), "Operation failed: {}", e);
            }
        }
        normalize(result)
    }

    async fn run(&self, operation: Operation, arguments: Value) -> GatewayResult<Payload> {
        let descriptor = self
            .descriptor(operation)
            .ok_or_else(|| GatewayError::UnknownOperation(operation.name().to_string()))?;
        let mut args = Arguments::from_value(arguments)?;

        self.guard.check(operation, &self.connection)?;

        // connect validates through its merged parameters instead
        if operation != Operation::Connect {
            if let Some(missing) = args.first_missing(descriptor) {
                return Err(GatewayError::missing(missing));
            }
            args.apply_defaults(descriptor);
        }

        let connection = self.connection.as_ref();
        match operation {
            Operation::Connect => {
                handlers::connect(connection, self.connection_params(&args)?).await
            }
            Operation::Search => handlers::search(connection, &args).await,
            Operation::SearchIds => handlers::search_ids(connection, &args).await,
            Operation::Read => handlers::read(connection, &args).await,
            Operation::Create => handlers::create(connection, &args).await,
            Operation::Write => handlers::write(connection, &args).await,
            Operation::Unlink => handlers::unlink(connection, &args).await,
            Operation::Call => handlers::call(connection, &args).await,
            Operation::GetModels => handlers::get_models(connection, &args).await,
            Operation::GetFields => handlers::get_fields(connection, &args).await,
            Operation::Count => handlers::count(connection, &args).await,
            Operation::ReadGroup => handlers::read_group(connection, &args).await,
        }
    }

    /// Explicit arguments merged over the configured defaults.
    ///
    /// Absent, null and empty-string arguments fall back; any other
    /// non-string value is an `InvalidParameter`.
    fn connection_params(&self, args: &Arguments) -> GatewayResult<ConnectionParams> {
        let explicit = PartialConnectionParams {
            url: args.opt_str("url")?.map(str::to_string),
            database: args.opt_str("database")?.map(str::to_string),
            username: args.opt_str("username")?.map(str::to_string),
            password: args.opt_str("password")?.map(str::to_string),
        };
        explicit
            .or(&self.connection_defaults)
            .complete()
            .map_err(GatewayError::missing)
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("connection", &self.connection)
            .field("operations", &self.descriptors.len())
            .field("connection_defaults", &self.connection_defaults)
            .finish()
    }
}

//! One handler per operation
//!
//! Handlers receive arguments that already passed the required-parameter
//! check and carry every declared default.

use odoo_rpc_client::{ConnectionParams, ReadGroupRequest, RpcConnection};
use serde_json::Value;

use crate::arguments::Arguments;
use crate::envelope::Payload;
use crate::error::GatewayResult;
use crate::payload;

pub async fn connect(connection: &RpcConnection, params: ConnectionParams) -> GatewayResult<Payload> {
    let session = connection.connect(params).await?;

    Ok(payload! {
        "message" => format!(
            "Successfully connected to Odoo at {} (database: {})",
            session.url, session.database
        ),
        "url" => session.url,
        "database" => session.database,
        "uid" => session.uid,
    })
}

pub async fn search(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let records = connection
        .search_read(
            args.str("model")?,
            args.list("domain")?,
            &args.strings("fields")?,
            args.opt_count("limit")?,
        )
        .await?;

    Ok(payload! {
        "count" => records.len(),
        "records" => records,
    })
}

pub async fn search_ids(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let ids = connection
        .search(args.str("model")?, args.list("domain")?, args.opt_count("limit")?)
        .await?;

    Ok(payload! {
        "count" => ids.len(),
        "ids" => ids,
    })
}

pub async fn read(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let records = connection
        .read(args.str("model")?, &args.ids("ids")?, &args.strings("fields")?)
        .await?;

    Ok(payload! {
        "count" => records.len(),
        "records" => records,
    })
}

pub async fn create(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let id = connection
        .create(args.str("model")?, args.object("values")?)
        .await?;

    Ok(payload! {
        "id" => id,
        "message" => format!("Created record with ID: {id}"),
    })
}

pub async fn write(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let ids = args.ids("ids")?;
    let result = connection
        .write(args.str("model")?, &ids, args.object("values")?)
        .await?;

    Ok(payload! {
        "updated" => ids.len(),
        "result" => result,
        "message" => format!("Updated {} records", ids.len()),
    })
}

pub async fn unlink(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let ids = args.ids("ids")?;
    let result = connection.unlink(args.str("model")?, &ids).await?;

    Ok(payload! {
        "deleted" => ids.len(),
        "result" => result,
        "message" => format!("Deleted {} records", ids.len()),
    })
}

pub async fn call(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let result: Value = connection
        .call_method(
            args.str("model")?,
            args.str("method")?,
            args.list("args")?,
            args.object("kwargs")?,
        )
        .await?;

    Ok(payload! { "result" => result })
}

pub async fn get_models(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let models = connection.get_models(args.opt_str("filter")?).await?;

    Ok(payload! {
        "count" => models.len(),
        "models" => models,
    })
}

pub async fn get_fields(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let model = args.str("model")?;
    let fields = connection.get_fields(model).await?;

    Ok(payload! {
        "model" => model,
        "fields" => fields,
    })
}

pub async fn count(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let model = args.str("model")?;
    let count = connection.count(model, args.list("domain")?).await?;

    Ok(payload! {
        "model" => model,
        "count" => count,
    })
}

pub async fn read_group(connection: &RpcConnection, args: &Arguments) -> GatewayResult<Payload> {
    let request = ReadGroupRequest {
        domain: args.list("domain")?,
        fields: args.strings("fields")?,
        groupby: args.strings("groupby")?,
        limit: args.opt_count("limit")?,
        orderby: args.opt_str("orderby")?.map(str::to_string),
        lazy: args.opt_bool("lazy")?,
    };
    let groups = connection.read_group(args.str("model")?, request).await?;

    Ok(payload! {
        "count" => groups.len(),
        "groups" => groups,
    })
}

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wxpay_v2::{NotifyReply, PayClient, PayConfig, UnifiedOrderParams};

/// 微信支付 V2 命令行工具
#[derive(Parser, Debug)]
#[command(name = "wxpay", version, about = "WeChat Pay v2 merchant API client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 统一下单并输出 JSAPI 调起参数
    Prepay(PrepayArgs),
    /// 查询订单
    Query(QueryArgs),
    /// 关闭订单
    Close {
        #[arg(long)]
        out_trade_no: String,
    },
    /// 解析保存下来的支付结果通知
    Notify(NotifyArgs),
}

#[derive(Args, Debug)]
struct PrepayArgs {
    /// 订单总金额，单位为分
    #[arg(long)]
    total_fee: String,
    #[arg(long)]
    ip: String,
    #[arg(long)]
    body: String,
    #[arg(long, default_value = "")]
    fee_type: String,
    #[arg(long)]
    out_trade_no: String,
    #[arg(long)]
    openid: String,
    /// 覆盖配置中的通知地址
    #[arg(long, default_value = "")]
    notify_url: String,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct QueryArgs {
    #[arg(long)]
    out_trade_no: Option<String>,
    #[arg(long)]
    transaction_id: Option<String>,
}

#[derive(Args, Debug)]
struct NotifyArgs {
    /// 通知请求体文件
    #[arg(long)]
    file: std::path::PathBuf,
    /// 以下三项齐全时校验签名
    #[arg(long)]
    out_trade_no: Option<String>,
    #[arg(long)]
    openid: Option<String>,
    #[arg(long)]
    total_fee: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = PayConfig::from_env()?;
    info!("WeChat Pay configuration loaded for mch_id: {}", config.mch_id);

    let client = PayClient::from_config(config)?;

    match cli.command {
        Command::Prepay(args) => {
            let params = UnifiedOrderParams {
                total_fee: args.total_fee,
                create_ip: args.ip,
                body: args.body,
                fee_type: args.fee_type,
                out_trade_no: args.out_trade_no,
                openid: args.openid,
                notify_url: args.notify_url,
            };
            let jsapi = client.jsapi_params(&params).await?;
            println!("{}", serde_json::to_string_pretty(&jsapi)?);
        }
        Command::Query(args) => {
            let result = match (args.out_trade_no, args.transaction_id) {
                (Some(no), _) => client.order_query(&no).await?,
                (None, Some(id)) => client.order_query_by_transaction_id(&id).await?,
                (None, None) => anyhow::bail!("either --out-trade-no or --transaction-id is required"),
            };
            match result.trade_state() {
                Some(state) => info!("Trade state: {}", state),
                None => info!("Trade state not reported"),
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Close { out_trade_no } => {
            let result = client.close_order(&out_trade_no).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Notify(args) => {
            let body = std::fs::read(&args.file)
                .with_context(|| format!("Failed to read {}", args.file.display()))?;

            let result = match client.parse_notification(&body) {
                Ok(result) => result,
                Err(e) => {
                    println!("{}", NotifyReply::fail(e.to_string()).to_xml()?);
                    return Err(e.into());
                }
            };

            if let (Some(out_trade_no), Some(openid), Some(total_fee)) =
                (args.out_trade_no, args.openid, args.total_fee)
            {
                let params = UnifiedOrderParams {
                    total_fee,
                    out_trade_no,
                    openid,
                    ..Default::default()
                };
                client.verify_notification_sign(&result, &params)?;
                info!("Notification signature verified");
            }

            eprintln!("{}", serde_json::to_string_pretty(&result)?);
            println!("{}", NotifyReply::success().to_xml()?);
        }
    }

    Ok(())
}

use std::io::{self, BufRead};

use aivdm_parser::{AisDecoder, MessageBody};
use tracing_subscriber::EnvFilter;

const SAMPLE: &[&str] = &[
    "\\s:2573345,c:1671620143*0E\\!AIVDM,1,1,,A,1:02Ih001U0d=V:Op85<2aT>0<0F,0*22",
    "!BSVDM,2,2,5,A,888888888888880,2*38",
    "!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55",
    "!AIVDM,1,1,,B,4h3Ovk1udp6I9o>jPHEdjdW000S:,0*0C",
    "!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*740008,2*09",
    "!AIVDM,1,1,,B,00,4*21",
];

fn describe(body: &MessageBody) -> String {
    match body {
        MessageBody::PositionReportScheduled(report)
        | MessageBody::PositionReportAssigned(report)
        | MessageBody::PositionReportResponse(report) => format!(
            "position {:?}, {:?} at {:?} knots",
            report.latitude, report.longitude, report.speed_over_ground
        ),
        MessageBody::BaseStationReport(report) => format!("base station time {:?}", report.utc()),
        MessageBody::StaticAndVoyageData(data) => {
            format!("{} bound for {}", data.vessel_name, data.destination)
        }
        other => format!("{other:?}"),
    }
}

/// Decodes the lines given on stdin, or a built-in sample when stdin is empty.
///
/// Run with `RUST_LOG=aivdm_parser=debug` to see fragment assembly.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut lines: Vec<String> = io::stdin().lock().lines().map_while(Result::ok).collect();
    if lines.is_empty() {
        lines = SAMPLE.iter().map(|line| line.to_string()).collect();
    }

    let decoder = AisDecoder::with_source("stdin");
    for result in decoder.decode_all(&lines) {
        match result {
            Ok(message) => println!(
                "type {:>2} from {}: {}",
                message.message_type(),
                message.source_mmsi(),
                describe(message.body())
            ),
            Err(error) => println!("error: {error}"),
        }
    }

    if decoder.pending() > 0 {
        println!("{} incomplete fragment groups", decoder.pending());
    }
}

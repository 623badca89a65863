use time::{Duration, OffsetDateTime};

use crate::{
    AisMessage, BitSequence, DecodeError, FragmentAssembler, InvalidMessage, MessageBody,
    Metadata, NmeaParseError, NmeaSentence, TagBlock,
};

const POSITION_B: &str = "!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E";
const POSITION_A: &str = "!AIVDM,1,1,,A,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5D";
const STATIC_FIRST: &str =
    "!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55";
const STATIC_SECOND: &str = "!BSVDM,2,2,5,A,888888888888880,2*38";

fn sentences(lines: &[&str]) -> Vec<NmeaSentence> {
    lines
        .iter()
        .map(|line| NmeaSentence::parse(line).unwrap())
        .collect()
}

fn received() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1609841515).unwrap()
}

#[test]
fn test_decoding_is_deterministic() {
    let first = AisMessage::create(sentences(&[POSITION_B])).unwrap();
    let second = AisMessage::create(sentences(&[POSITION_B])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_channel_takes_part_in_equality() {
    let on_b = AisMessage::create(sentences(&[POSITION_B])).unwrap();
    let on_a = AisMessage::create(sentences(&[POSITION_A])).unwrap();
    assert_eq!(on_a.body(), on_b.body());
    assert_ne!(on_a, on_b);

    let other = AisMessage::create(sentences(&["!AIVDM,1,1,,A,13AkSB0000PhAmHPoTNcp1Fp0D17,0*00"]))
        .unwrap();
    assert_ne!(on_a, other);
}

#[test]
fn test_metadata_equality() {
    let metadata = Metadata::new("source", received());
    let first = AisMessage::create_with_metadata(metadata.clone(), sentences(&[POSITION_B])).unwrap();
    let second =
        AisMessage::create_with_metadata(metadata.clone(), sentences(&[POSITION_B])).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.metadata(), Some(&metadata));

    let later = Metadata::new("source", received() + Duration::milliseconds(1));
    let third = AisMessage::create_with_metadata(later, sentences(&[POSITION_B])).unwrap();
    assert_ne!(first, third);

    let elsewhere = Metadata::new("other source", received());
    let fourth = AisMessage::create_with_metadata(elsewhere, sentences(&[POSITION_B])).unwrap();
    assert_ne!(first, fourth);

    let without = AisMessage::create(sentences(&[POSITION_B])).unwrap();
    assert_ne!(first, without);
}

#[test]
fn test_tag_block_is_attached() {
    let tag_block = TagBlock::parse("\\c:1609841515,s:my dearest AIS base station*6E\\").unwrap();
    let message = AisMessage::create_with_tag_block(
        Metadata::new("source", received()),
        tag_block.clone(),
        sentences(&[POSITION_B]),
    )
    .unwrap();

    assert_eq!(message.tag_block(), Some(&tag_block));
    assert_eq!(message.metadata().unwrap().received(), received());
    assert_eq!(
        tag_block.timestamp().map(OffsetDateTime::unix_timestamp),
        Some(1609841515)
    );
}

#[test]
fn test_raw_messages_single_fragment() {
    let message = AisMessage::create(sentences(&[POSITION_B])).unwrap();
    assert_eq!(message.nmea_messages().len(), 1);
    assert_eq!(message.nmea_messages()[0].raw_message(), POSITION_B);
}

#[test]
fn test_raw_messages_two_fragments() {
    let message = AisMessage::create(sentences(&[STATIC_FIRST, STATIC_SECOND])).unwrap();
    let raw: Vec<_> = message
        .nmea_messages()
        .iter()
        .map(NmeaSentence::raw_message)
        .collect();
    assert_eq!(raw, [STATIC_FIRST, STATIC_SECOND]);

    // Given out of order, the fragments are still returned in fragment order.
    let reversed = AisMessage::create(sentences(&[STATIC_SECOND, STATIC_FIRST])).unwrap();
    assert_eq!(reversed, message);
}

#[test]
fn test_empty_payload() {
    let result = AisMessage::create(sentences(&["!AIVDM,1,1,,B,00,4*21"]));
    assert!(matches!(
        result,
        Err(DecodeError::InvalidMessage(InvalidMessage::Truncated { .. }))
    ));
}

#[test]
fn test_double_checksum() {
    let result = NmeaSentence::parse("!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*740008,2*09");
    assert!(matches!(result, Err(NmeaParseError::Malformed { .. })));
}

#[test]
fn test_hand_built_position_report() {
    // Type 1, MMSI 219997000, not defined status, SOG 0, lon 10.546635, COG 199.0,
    // heading 43, second 18 and a SOTDMA radio status of 81994.
    let payload = "13AkSB0000PhAmJPoTMoiQFT0D1:";
    let bits = BitSequence::from_payload(payload, 0).unwrap();

    assert_eq!(bits.get_unsigned(0, 6), Ok(1));
    assert_eq!(bits.get_unsigned(6, 2), Ok(0));
    assert_eq!(bits.get_unsigned(8, 30), Ok(219997000));
    assert_eq!(bits.get_signed(61, 28), Ok(6327981));
    assert_eq!(bits.get_signed(89, 27), Ok(34464887));
    assert_eq!(bits.get_unsigned(116, 12), Ok(1990));
    assert_eq!(bits.get_unsigned(128, 9), Ok(43));
    assert_eq!(bits.get_unsigned(137, 6), Ok(18));
    assert_eq!(bits.get_unsigned(149, 19), Ok(81994));
    assert_eq!(bits.armor(), (payload.to_string(), 0));

    let message = AisMessage::create(sentences(&[POSITION_B])).unwrap();
    assert_eq!(message.bits(), &bits);
    let MessageBody::PositionReportScheduled(report) = message.body() else {
        panic!("expected a type 1 report, got {:?}", message.body());
    };
    assert_eq!(report.longitude, Some(10.546635));
    assert_eq!(report.course_over_ground, Some(199.0));
}

#[test]
fn test_out_of_order_assembly() {
    let assembler = FragmentAssembler::new();
    let [first, second]: [NmeaSentence; 2] = sentences(&[STATIC_FIRST, STATIC_SECOND])
        .try_into()
        .unwrap();

    assert_eq!(assembler.accept(second.clone()).unwrap(), None);
    let group = assembler.accept(first.clone()).unwrap().unwrap();

    let payload: String = group.iter().map(NmeaSentence::payload).collect();
    assert_eq!(payload, format!("{}{}", first.payload(), second.payload()));
}

#[cfg(feature = "serde")]
#[test]
fn test_serialize() {
    let sentence = NmeaSentence::parse(POSITION_B).unwrap();
    let json = serde_json::to_string(&sentence).unwrap();
    assert_eq!(json, serde_json::to_string(POSITION_B).unwrap());
    assert_eq!(serde_json::from_str::<NmeaSentence>(&json).unwrap(), sentence);

    let tag_block = TagBlock::parse("\\s:2573345,c:1671620143*0E\\").unwrap();
    let json = serde_json::to_string(&tag_block).unwrap();
    assert_eq!(serde_json::from_str::<TagBlock>(&json).unwrap(), tag_block);

    let message = AisMessage::create(vec![sentence]).unwrap();
    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["header"]["source_mmsi"], 219997000);
    assert_eq!(value["header"]["message_type"], 1);
    assert_eq!(value["sentences"][0], POSITION_B);
    assert!(value.get("bits").is_none());
    assert_eq!(
        value["body"]["PositionReportScheduled"]["true_heading"],
        43
    );
}

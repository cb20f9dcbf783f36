use crate::transform::rounds;
use crate::{transform, PollError, Point, ProtocolClient, TelemetryDocument, Thing};
use bacdweet_client::{ClientError, ReadPropertyResponse};
use bacdweet_core::value::decode_property;
use bacdweet_core::ValueError;
use log::{debug, warn};

/// Reads every point of `thing` once, in order, one request at a time.
///
/// Points whose read fails are logged and left out of the document. The only
/// error is a response for an object and property pair with no known
/// datatype.
pub async fn run_cycle<C: ProtocolClient>(
    client: &C,
    thing: &Thing,
) -> Result<TelemetryDocument, PollError> {
    let mut document = TelemetryDocument::new();
    for point in &thing.points {
        let response = match read_point(client, point).await {
            Ok(response) => response,
            Err(err) => {
                warn!("{}: read of {} failed: {err}", thing.name, point.tag);
                continue;
            }
        };

        let object_type = response.object_id.object_type();
        let value = match decode_property(
            object_type,
            response.property_id,
            &response.value,
            response.array_index,
        ) {
            Ok(value) => value,
            Err(ValueError::UnknownDatatype {
                object_type,
                property_id,
            }) => {
                return Err(PollError::UnknownDatatype {
                    object_type,
                    property_id,
                })
            }
            Err(ValueError::Decode(err)) => {
                warn!("{}: value of {} undecodable: {err}", thing.name, point.tag);
                continue;
            }
        };
        debug!("{}: {} = {value:?}", thing.name, point.tag);

        let rounded = rounds(point, &value);
        let display = transform(point, value);
        if rounded {
            debug!("{}: {} rounded to {display}", thing.name, point.tag);
        }
        document.insert(point.tag.as_str(), display);
    }
    Ok(document)
}

async fn read_point<C: ProtocolClient>(
    client: &C,
    point: &Point,
) -> Result<ReadPropertyResponse, ClientError> {
    let handle = client.submit(point.read_request()).await?;
    client.await_result(handle).await
}

#[cfg(test)]
mod tests {
    use super::run_cycle;
    use crate::testing::{enumerated, point_on, real, thing, Reply, ScriptedClient};
    use crate::{DisplayValue, PollError};
    use bacdweet_core::types::{ObjectId, ObjectType, PropertyId};

    fn ai(instance: u32) -> ObjectId {
        ObjectId::new(ObjectType::AnalogInput, instance)
    }

    #[tokio::test]
    async fn lobby_document() {
        let mut temp = point_on("temp", ObjectType::AnalogInput, 1);
        temp.precision = Some(1);
        let mut occupied = point_on("occupied", ObjectType::BinaryInput, 2);
        occupied.active_label = Some("yes".into());
        let lobby = thing("lobby", 60, vec![temp, occupied]);

        let client = ScriptedClient::default()
            .reply(ai(1), Reply::Value(real(21.96)))
            .reply(
                ObjectId::new(ObjectType::BinaryInput, 2),
                Reply::Value(enumerated(1)),
            );

        let doc = run_cycle(&client, &lobby).await.unwrap();
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"temp":22.0,"occupied":"yes"}"#
        );
    }

    #[tokio::test]
    async fn failed_points_are_skipped_in_order() {
        let points = (1..=4)
            .map(|i| point_on(&format!("p{i}"), ObjectType::AnalogInput, i))
            .collect();
        let client = ScriptedClient::default()
            .reply(ai(1), Reply::Value(real(1.5)))
            .reply(ai(2), Reply::Timeout)
            .reply(ai(3), Reply::Reject)
            .reply(ai(4), Reply::Value(real(4.5)));

        let doc = run_cycle(&client, &thing("t", 10, points)).await.unwrap();
        assert_eq!(doc.tags().collect::<Vec<_>>(), ["p1", "p4"]);
        assert_eq!(doc.get("p4"), Some(&DisplayValue::Float(4.5)));

        // every point was still asked for, in configured order
        let asked: Vec<_> = client.requests().iter().map(|r| r.object_id).collect();
        assert_eq!(asked, [ai(1), ai(2), ai(3), ai(4)]);
    }

    #[tokio::test]
    async fn requests_default_to_present_value() {
        let client = ScriptedClient::default();
        let one = thing("t", 10, vec![point_on("a", ObjectType::AnalogInput, 1)]);
        let doc = run_cycle(&client, &one).await.unwrap();
        assert!(doc.is_empty());
        let requests = client.requests();
        assert_eq!(requests[0].property_id, PropertyId::PresentValue);
        assert_eq!(requests[0].array_index, None);
    }

    #[tokio::test]
    async fn undecodable_value_is_skipped() {
        // REAL expected, boolean received
        let client = ScriptedClient::default()
            .reply(ai(1), Reply::Value(vec![0x11]))
            .reply(ai(2), Reply::Value(real(2.0)));
        let points = vec![
            point_on("bad", ObjectType::AnalogInput, 1),
            point_on("good", ObjectType::AnalogInput, 2),
        ];
        let doc = run_cycle(&client, &thing("t", 10, points)).await.unwrap();
        assert_eq!(doc.tags().collect::<Vec<_>>(), ["good"]);
    }

    #[tokio::test]
    async fn unknown_datatype_is_fatal() {
        let client = ScriptedClient::default().reply(
            ai(1),
            Reply::Relabelled(ObjectId::new(ObjectType::Proprietary(600), 1), real(1.0)),
        );
        let one = thing("t", 10, vec![point_on("a", ObjectType::AnalogInput, 1)]);
        let err = run_cycle(&client, &one).await.unwrap_err();
        assert!(matches!(
            err,
            PollError::UnknownDatatype {
                object_type: ObjectType::Proprietary(600),
                property_id: PropertyId::PresentValue,
            }
        ));
    }

    #[tokio::test]
    async fn array_length_is_read_through_index_zero() {
        let mut states = point_on("states", ObjectType::MultiStateValue, 4);
        states.property_id = PropertyId::StateText;
        states.array_index = Some(0);
        let client = ScriptedClient::default().reply(
            ObjectId::new(ObjectType::MultiStateValue, 4),
            Reply::Value(vec![0x21, 0x03]),
        );

        let doc = run_cycle(&client, &thing("t", 10, vec![states])).await.unwrap();
        assert_eq!(doc.get("states"), Some(&DisplayValue::Unsigned(3)));
        assert_eq!(client.requests()[0].array_index, Some(0));
    }

    #[tokio::test]
    async fn array_element_decodes_as_element_type() {
        let mut state = point_on("state", ObjectType::MultiStateValue, 4);
        state.property_id = PropertyId::StateText;
        state.array_index = Some(2);
        let client = ScriptedClient::default().reply(
            ObjectId::new(ObjectType::MultiStateValue, 4),
            Reply::Value(vec![0x75, 0x04, 0x00, b'O', b'f', b'f']),
        );

        let doc = run_cycle(&client, &thing("t", 10, vec![state])).await.unwrap();
        assert_eq!(doc.get("state"), Some(&DisplayValue::Text("Off".into())));
        assert_eq!(client.requests()[0].array_index, Some(2));
    }
}

use crate::types::{Enumeration, ObjectType, PropertyId};

/// How a property's value is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    Null,
    Boolean,
    Unsigned,
    Signed,
    Real,
    Double,
    OctetString,
    CharacterString,
    BitString,
    Enumerated(Enumeration),
    Date,
    Time,
    ObjectId,
    /// Any single application-tagged value (priority array slots).
    Any,
    /// BACnetARRAY of the element type.
    Array(&'static Datatype),
}

impl Datatype {
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }
}

const ANY: Datatype = Datatype::Any;
const CHARACTER_STRING: Datatype = Datatype::CharacterString;
const OBJECT_ID: Datatype = Datatype::ObjectId;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Family {
    Analog,
    Binary,
    MultiState,
}

/// Resolves the declared datatype of `property` on objects of
/// `object_type`, `None` when the pair is not in the schema.
pub fn lookup_datatype(object_type: ObjectType, property: PropertyId) -> Option<Datatype> {
    use Datatype as D;
    use PropertyId as P;

    if let Some(common) = common_property(property) {
        return Some(common);
    }

    let (family, commandable) = match object_type {
        ObjectType::AnalogInput => (Family::Analog, false),
        ObjectType::AnalogOutput | ObjectType::AnalogValue => (Family::Analog, true),
        ObjectType::BinaryInput => (Family::Binary, false),
        ObjectType::BinaryOutput | ObjectType::BinaryValue => (Family::Binary, true),
        ObjectType::MultiStateInput => (Family::MultiState, false),
        ObjectType::MultiStateOutput | ObjectType::MultiStateValue => (Family::MultiState, true),
        ObjectType::Accumulator => {
            return match property {
                P::PresentValue => Some(D::Unsigned),
                P::Units => Some(D::Enumerated(Enumeration::EngineeringUnits)),
                _ => None,
            }
        }
        ObjectType::Device => return device_property(property),
        _ => return None,
    };

    let present_value = match family {
        Family::Analog => D::Real,
        Family::Binary => D::Enumerated(Enumeration::BinaryPv),
        Family::MultiState => D::Unsigned,
    };

    match (family, property) {
        (_, P::PresentValue) => Some(present_value),
        (_, P::PriorityArray) if commandable => Some(D::Array(&ANY)),
        (_, P::RelinquishDefault) if commandable => Some(present_value),
        (
            Family::Analog,
            P::CovIncrement | P::MinPresValue | P::MaxPresValue | P::Resolution,
        ) => Some(D::Real),
        (Family::Analog, P::Units) => Some(D::Enumerated(Enumeration::EngineeringUnits)),
        (Family::Binary, P::Polarity) if object_type != ObjectType::BinaryValue => {
            Some(D::Enumerated(Enumeration::Polarity))
        }
        (Family::Binary, P::ActiveText | P::InactiveText) => Some(D::CharacterString),
        (Family::MultiState, P::NumberOfStates) => Some(D::Unsigned),
        (Family::MultiState, P::StateText) => Some(D::Array(&CHARACTER_STRING)),
        _ => None,
    }
}

fn common_property(property: PropertyId) -> Option<Datatype> {
    use Datatype as D;
    use PropertyId as P;

    Some(match property {
        P::ObjectIdentifier => D::ObjectId,
        P::ObjectName | P::Description => D::CharacterString,
        P::ObjectType => D::Enumerated(Enumeration::ObjectType),
        P::StatusFlags => D::BitString,
        P::EventState => D::Enumerated(Enumeration::EventState),
        P::Reliability => D::Enumerated(Enumeration::Reliability),
        P::OutOfService => D::Boolean,
        _ => return None,
    })
}

fn device_property(property: PropertyId) -> Option<Datatype> {
    use Datatype as D;
    use PropertyId as P;

    Some(match property {
        P::ObjectList => D::Array(&OBJECT_ID),
        P::VendorName
        | P::ModelName
        | P::FirmwareRevision
        | P::ApplicationSoftwareVersion
        | P::Location => D::CharacterString,
        P::VendorIdentifier | P::ProtocolVersion | P::MaxApduLengthAccepted => D::Unsigned,
        P::SegmentationSupported => D::Enumerated(Enumeration::Segmentation),
        P::SystemStatus => D::Enumerated(Enumeration::DeviceStatus),
        P::LocalDate => D::Date,
        P::LocalTime => D::Time,
        _ => return None,
    })
}

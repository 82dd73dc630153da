pub mod availability;
pub mod bookings;
pub mod domain;
pub mod ledger;
pub mod ports;

pub use availability::{AvailabilityChecker, SlotTemplate};
pub use bookings::{BookingManager, BookingPolicy, BookingRequest, BookingSchedule};
pub use domain::{
    AuthSession, Booking, BookingId, BookingStatus, Message, MessageId, NewBooking, NewMessage,
    NewUser, ProfileUpdate, Provider, ProviderId, ProviderView, Service, ServiceId, User,
    UserCredentials, UserId,
};
pub use ledger::{Ledger, AUTO_REPLY_TEXT};
pub use ports::{EntityStore, PortError, PortResult};

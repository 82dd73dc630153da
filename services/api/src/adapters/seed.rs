//! services/api/src/adapters/seed.rs
//!
//! The static service catalog and provider roster loaded into every store at startup.

use home_services_core::domain::{Provider, Service};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn services() -> Vec<Service> {
    vec![
        Service {
            id: 1,
            name: "House Cleaning".to_string(),
            short_description:
                "Get help with cleaning your home, including dusting, vacuuming, and more."
                    .to_string(),
            description: "Professional cleaning services for your home, including dusting, vacuuming, mopping, bathroom and kitchen cleaning.".to_string(),
            icon: "cleaning_services".to_string(),
            inclusions: strings(&[
                "Dusting of all surfaces and furniture",
                "Vacuuming carpets and rugs",
                "Mopping hard floors",
                "Bathroom cleaning (toilet, shower, sink)",
                "Kitchen cleaning (counters, sink, outside of appliances)",
            ]),
        },
        Service {
            id: 2,
            name: "Yard Work".to_string(),
            short_description:
                "Assistance with lawn mowing, gardening, and outdoor maintenance tasks."
                    .to_string(),
            description: "Complete yard maintenance services including lawn mowing, garden care, leaf removal, and seasonal outdoor maintenance.".to_string(),
            icon: "yard".to_string(),
            inclusions: strings(&[
                "Lawn mowing and edging",
                "Garden weeding and maintenance",
                "Leaf and debris removal",
                "Shrub and hedge trimming",
                "Basic outdoor cleaning",
            ]),
        },
        Service {
            id: 3,
            name: "Grocery Shopping".to_string(),
            short_description:
                "Someone to help you shop for groceries or deliver them to your home.".to_string(),
            description: "Assistance with grocery shopping, including creating shopping lists, picking up items, and delivering them to your home.".to_string(),
            icon: "shopping_basket".to_string(),
            inclusions: strings(&[
                "Creating grocery lists",
                "Shopping at your preferred stores",
                "Picking fresh produce and quality items",
                "Delivery to your home",
                "Assistance with putting groceries away",
            ]),
        },
        Service {
            id: 4,
            name: "Caregiver Services".to_string(),
            short_description:
                "Professional caregivers offering personal care, companionship, and support."
                    .to_string(),
            description: "Professional caregiving services providing personal assistance, medication reminders, meal preparation, and companionship.".to_string(),
            icon: "health_and_safety".to_string(),
            inclusions: strings(&[
                "Personal care assistance",
                "Medication reminders",
                "Meal preparation",
                "Light housekeeping",
                "Companionship and emotional support",
            ]),
        },
    ]
}

pub fn providers() -> Vec<Provider> {
    vec![
        Provider {
            id: 1,
            name: "Sarah Johnson".to_string(),
            experience: "5 years experience, background checked, certified in home cleaning"
                .to_string(),
            rating: 4.5,
            reviews: 129,
            tags: strings(&["Available Weekdays", "Pet Friendly", "Eco Products"]),
            service_ids: vec![1],
        },
        Provider {
            id: 2,
            name: "Michael Chen".to_string(),
            experience: "8 years experience, background checked, deep cleaning specialist"
                .to_string(),
            rating: 5.0,
            reviews: 87,
            tags: strings(&["Weekend Availability", "Deep Cleaning", "Senior Specialist"]),
            service_ids: vec![1],
        },
        Provider {
            id: 3,
            name: "Robert Garcia".to_string(),
            experience:
                "10 years experience, licensed landscaper, organic gardening specialist"
                    .to_string(),
            rating: 4.8,
            reviews: 95,
            tags: strings(&["Organic Methods", "Equipment Provided", "7-Day Availability"]),
            service_ids: vec![2],
        },
        Provider {
            id: 4,
            name: "Jennifer Williams".to_string(),
            experience:
                "6 years experience, trained personal shopper, dietary needs specialist"
                    .to_string(),
            rating: 4.7,
            reviews: 112,
            tags: strings(&[
                "Dietary Restrictions",
                "Same-Day Delivery",
                "Comparative Shopping",
            ]),
            service_ids: vec![3],
        },
        Provider {
            id: 5,
            name: "David Thompson".to_string(),
            experience: "12 years experience, certified caregiver, specialized in elder care"
                .to_string(),
            rating: 4.9,
            reviews: 156,
            tags: strings(&["Elder Care", "Medical Background", "Overnight Available"]),
            service_ids: vec![4],
        },
    ]
}

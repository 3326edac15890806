use kiln::application;
use kiln_aot::decorate::CapabilityDecorator;
use kiln_aot::hints::ReflectiveOperation;
use kiln_aot::instance::{ComponentInstanceAnyPtr, ComponentInstancePtr};
use kiln_aot::registry::ConstructionStrategy;

#[allow(dead_code)]
struct Album {
    title: String,
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // create our pass application with config taken from the environment
    let mut application =
        application::create_default().expect("unable to create default application");

    // register a component descriptor for the pass to inspect
    application
        .pass_mut()
        .register_component::<Album>(
            "album",
            ConstructionStrategy::DefaultConstructor(|_| {
                Ok(ComponentInstancePtr::new(Album {
                    title: "Guardians of the GraalVM, Soundtrack Volume 23".to_string(),
                }) as ComponentInstanceAnyPtr)
            }),
        )
        .expect("unable to register component");

    // attach build provenance to every Album component
    let generator = application.provenance_generator("album_provenance");
    application.pass_mut().add_decorator(CapabilityDecorator::for_type::<Album, _>(
        "album_provenance",
        generator.into_generator(),
    ));

    // declare what must survive ahead-of-time compilation
    let hints = application.pass_mut().hints_mut();
    hints.register_reflective::<Album>(ReflectiveOperation::all());
    hints.register_resource("/hello");

    let manifest = application.run().expect("error running pass");

    for allowance in &manifest.reflective {
        println!("reflective: {}", allowance.type_name);
    }
    for resource in &manifest.resources {
        println!("resource: {}", resource.path);
    }
}
